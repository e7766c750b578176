//! Movement ledger repository for database operations.
//!
//! The ledger is append-only by design: this repository exposes no update or
//! delete. Corrections are recorded as new compensating entries.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::LedgerEntryEntity;
use crate::metrics::{record_ledger_append, QueryTimer};

const LEDGER_COLUMNS: &str = "id, material_id, serial_id, serial_number, operation, quantity, \
     reason, proof_refs, event_id, event_name, recorded_at";

/// Input data for appending a movement record.
#[derive(Debug, Clone)]
pub struct LedgerEntryInput {
    pub material_id: Uuid,
    pub serial_id: Option<Uuid>,
    pub serial_number: Option<String>,
    pub operation: String,
    pub quantity: i32,
    pub reason: Option<String>,
    pub proof_refs: Vec<String>,
    pub event_id: Option<Uuid>,
    pub event_name: Option<String>,
}

/// Query parameters for ledger pagination.
#[derive(Debug, Clone)]
pub struct LedgerQuery {
    /// Material to fetch movements for.
    pub material_id: Uuid,
    /// Narrow to one serial number.
    pub serial_number: Option<String>,
    /// Cursor timestamp (for pagination).
    pub cursor_recorded_at: Option<chrono::DateTime<chrono::Utc>>,
    /// Cursor ID (for pagination).
    pub cursor_id: Option<Uuid>,
    /// Number of results to return.
    pub limit: i32,
}

/// Repository for movement ledger database operations.
#[derive(Clone)]
pub struct LedgerRepository {
    pool: PgPool,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append one movement record.
    ///
    /// No business validation happens here; callers append inside the same
    /// transaction as the stock mutation the entry describes.
    pub async fn append(
        &self,
        conn: &mut PgConnection,
        input: LedgerEntryInput,
    ) -> Result<LedgerEntryEntity, sqlx::Error> {
        let timer = QueryTimer::new("append_ledger_entry");

        let result = sqlx::query_as::<_, LedgerEntryEntity>(&format!(
            r#"
            INSERT INTO ledger_entries (
                material_id, serial_id, serial_number, operation, quantity,
                reason, proof_refs, event_id, event_name
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {LEDGER_COLUMNS}
            "#,
        ))
        .bind(input.material_id)
        .bind(input.serial_id)
        .bind(&input.serial_number)
        .bind(&input.operation)
        .bind(input.quantity)
        .bind(&input.reason)
        .bind(&input.proof_refs)
        .bind(input.event_id)
        .bind(&input.event_name)
        .fetch_one(conn)
        .await;

        timer.record();
        if result.is_ok() {
            record_ledger_append(&input.operation);
        }
        result
    }

    /// Get movements for a material, newest first, with keyset pagination.
    ///
    /// Returns `(entries, has_more)` tuple.
    pub async fn query_by_material(
        &self,
        query: LedgerQuery,
    ) -> Result<(Vec<LedgerEntryEntity>, bool), sqlx::Error> {
        let timer = QueryTimer::new("query_ledger_by_material");

        // Fetch limit + 1 to determine if more results exist
        let fetch_limit = (query.limit + 1) as i64;

        let entries = sqlx::query_as::<_, LedgerEntryEntity>(&format!(
            r#"
            SELECT {LEDGER_COLUMNS}
            FROM ledger_entries
            WHERE material_id = $1
              AND ($2::text IS NULL OR serial_number = $2)
              AND ($3::timestamptz IS NULL OR (recorded_at, id) < ($3, $4))
            ORDER BY recorded_at DESC, id DESC
            LIMIT $5
            "#,
        ))
        .bind(query.material_id)
        .bind(&query.serial_number)
        .bind(query.cursor_recorded_at)
        .bind(query.cursor_id.unwrap_or_else(|| Uuid::from_bytes([0xff; 16])))
        .bind(fetch_limit)
        .fetch_all(&self.pool)
        .await?;

        timer.record();

        // Check if there are more results
        let has_more = entries.len() > query.limit as usize;
        let mut result = entries;
        if has_more {
            result.pop(); // Remove the extra record
        }

        Ok((result, has_more))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_entry_input_creation() {
        let input = LedgerEntryInput {
            material_id: Uuid::new_v4(),
            serial_id: None,
            serial_number: None,
            operation: "STOCK_ENTRY".to_string(),
            quantity: 50,
            reason: Some("compra inicial".to_string()),
            proof_refs: vec![],
            event_id: None,
            event_name: None,
        };

        assert_eq!(input.operation, "STOCK_ENTRY");
        assert_eq!(input.quantity, 50);
    }

    #[test]
    fn test_ledger_query_creation() {
        let query = LedgerQuery {
            material_id: Uuid::new_v4(),
            serial_number: Some("SN-001".to_string()),
            cursor_recorded_at: None,
            cursor_id: None,
            limit: 50,
        };

        assert_eq!(query.limit, 50);
        assert!(query.serial_number.is_some());
        assert!(query.cursor_id.is_none());
    }

    #[test]
    fn test_ledger_query_with_cursor() {
        let query = LedgerQuery {
            material_id: Uuid::new_v4(),
            serial_number: None,
            cursor_recorded_at: Some(chrono::Utc::now()),
            cursor_id: Some(Uuid::new_v4()),
            limit: 25,
        };

        assert!(query.cursor_recorded_at.is_some());
        assert!(query.cursor_id.is_some());
    }
}
