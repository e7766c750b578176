//! Serial repository for database operations.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::SerialEntity;
use crate::metrics::QueryTimer;

const SERIAL_COLUMNS: &str = "id, material_id, serial_number, status, location, tags, \
     event_id, event_name, created_at, updated_at";

/// Input data for registering a serialized unit.
#[derive(Debug, Clone)]
pub struct SerialInput {
    pub material_id: Uuid,
    pub serial_number: String,
    pub location: Option<String>,
    pub tags: Vec<String>,
}

/// Repository for serial database operations.
#[derive(Clone)]
pub struct SerialRepository {
    pool: PgPool,
}

impl SerialRepository {
    /// Creates a new SerialRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a serial, detecting duplicates atomically.
    ///
    /// Uses INSERT ... ON CONFLICT DO NOTHING; returns `None` when the
    /// (material, number) pair already exists.
    pub async fn insert(
        &self,
        conn: &mut PgConnection,
        input: SerialInput,
    ) -> Result<Option<SerialEntity>, sqlx::Error> {
        let timer = QueryTimer::new("insert_serial");

        let result = sqlx::query_as::<_, SerialEntity>(&format!(
            r#"
            INSERT INTO serials (material_id, serial_number, location, tags)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (material_id, serial_number) DO NOTHING
            RETURNING {SERIAL_COLUMNS}
            "#,
        ))
        .bind(input.material_id)
        .bind(&input.serial_number)
        .bind(&input.location)
        .bind(&input.tags)
        .fetch_optional(conn)
        .await;

        timer.record();
        result
    }

    /// Find a serial by material and number.
    pub async fn find_by_number(
        &self,
        material_id: Uuid,
        serial_number: &str,
    ) -> Result<Option<SerialEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_serial_by_number");

        let result = sqlx::query_as::<_, SerialEntity>(&format!(
            "SELECT {SERIAL_COLUMNS} FROM serials WHERE material_id = $1 AND serial_number = $2",
        ))
        .bind(material_id)
        .bind(serial_number)
        .fetch_optional(&self.pool)
        .await;

        timer.record();
        result
    }

    /// Find a serial by material and number with a row lock.
    ///
    /// The lock guarantees at most one concurrent allocation can observe the
    /// unit as available.
    pub async fn lock_by_number(
        &self,
        conn: &mut PgConnection,
        material_id: Uuid,
        serial_number: &str,
    ) -> Result<Option<SerialEntity>, sqlx::Error> {
        let timer = QueryTimer::new("lock_serial_by_number");

        let result = sqlx::query_as::<_, SerialEntity>(&format!(
            r#"
            SELECT {SERIAL_COLUMNS} FROM serials
            WHERE material_id = $1 AND serial_number = $2
            FOR UPDATE
            "#,
        ))
        .bind(material_id)
        .bind(serial_number)
        .fetch_optional(conn)
        .await;

        timer.record();
        result
    }

    /// Find a serial by ID with a row lock.
    pub async fn lock_by_id(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<SerialEntity>, sqlx::Error> {
        let timer = QueryTimer::new("lock_serial_by_id");

        let result = sqlx::query_as::<_, SerialEntity>(&format!(
            "SELECT {SERIAL_COLUMNS} FROM serials WHERE id = $1 FOR UPDATE",
        ))
        .bind(id)
        .fetch_optional(conn)
        .await;

        timer.record();
        result
    }

    /// List all serials of a material.
    pub async fn list_for_material(
        &self,
        material_id: Uuid,
    ) -> Result<Vec<SerialEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_serials_for_material");

        let result = sqlx::query_as::<_, SerialEntity>(&format!(
            "SELECT {SERIAL_COLUMNS} FROM serials WHERE material_id = $1 ORDER BY serial_number",
        ))
        .bind(material_id)
        .fetch_all(&self.pool)
        .await;

        timer.record();
        result
    }

    /// Transition a serial to IN_USE, attaching the event link.
    pub async fn mark_in_use(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        event_id: Uuid,
        event_name: Option<&str>,
    ) -> Result<SerialEntity, sqlx::Error> {
        let timer = QueryTimer::new("mark_serial_in_use");

        let result = sqlx::query_as::<_, SerialEntity>(&format!(
            r#"
            UPDATE serials
            SET status = 'IN_USE', event_id = $2, event_name = $3, updated_at = now()
            WHERE id = $1
            RETURNING {SERIAL_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(event_id)
        .bind(event_name)
        .fetch_one(conn)
        .await;

        timer.record();
        result
    }

    /// Transition a serial out of IN_USE, clearing the event link.
    ///
    /// `status` must be one of the non-IN_USE statuses; the event-link CHECK
    /// constraint rejects anything else.
    pub async fn release(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        status: &str,
    ) -> Result<SerialEntity, sqlx::Error> {
        let timer = QueryTimer::new("release_serial");

        let result = sqlx::query_as::<_, SerialEntity>(&format!(
            r#"
            UPDATE serials
            SET status = $2, event_id = NULL, event_name = NULL, updated_at = now()
            WHERE id = $1
            RETURNING {SERIAL_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(status)
        .fetch_one(conn)
        .await;

        timer.record();
        result
    }

    /// Delete a serial. Returns the number of deleted rows.
    pub async fn delete(
        &self,
        conn: &mut PgConnection,
        material_id: Uuid,
        serial_number: &str,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_serial");

        let result = sqlx::query(
            "DELETE FROM serials WHERE material_id = $1 AND serial_number = $2",
        )
        .bind(material_id)
        .bind(serial_number)
        .execute(conn)
        .await?;

        timer.record();
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_input_creation() {
        let input = SerialInput {
            material_id: Uuid::new_v4(),
            serial_number: "SN-001".to_string(),
            location: Some("Depósito A".to_string()),
            tags: vec!["par64".to_string(), "rgbw".to_string()],
        };

        assert_eq!(input.serial_number, "SN-001");
        assert_eq!(input.tags.len(), 2);
    }

    #[test]
    fn test_serial_input_minimal() {
        let input = SerialInput {
            material_id: Uuid::new_v4(),
            serial_number: "SN-002".to_string(),
            location: None,
            tags: vec![],
        };

        assert!(input.location.is_none());
        assert!(input.tags.is_empty());
    }
}
