//! Checklist line repository for database operations.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::ChecklistLineEntity;
use crate::metrics::QueryTimer;

const LINE_COLUMNS: &str =
    "id, event_id, material_id, required_quantity, allocated_quantity, created_at, updated_at";

/// Input data for inserting a checklist line.
#[derive(Debug, Clone)]
pub struct ChecklistLineInput {
    pub event_id: Uuid,
    pub material_id: Uuid,
    pub required_quantity: i32,
}

/// Repository for checklist line database operations.
#[derive(Clone)]
pub struct ChecklistLineRepository {
    pool: PgPool,
}

impl ChecklistLineRepository {
    /// Creates a new ChecklistLineRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a requirement line for an event.
    pub async fn insert(
        &self,
        input: ChecklistLineInput,
    ) -> Result<ChecklistLineEntity, sqlx::Error> {
        let timer = QueryTimer::new("insert_checklist_line");

        let result = sqlx::query_as::<_, ChecklistLineEntity>(&format!(
            r#"
            INSERT INTO checklist_lines (event_id, material_id, required_quantity)
            VALUES ($1, $2, $3)
            RETURNING {LINE_COLUMNS}
            "#,
        ))
        .bind(input.event_id)
        .bind(input.material_id)
        .bind(input.required_quantity)
        .fetch_one(&self.pool)
        .await;

        timer.record();
        result
    }

    /// Get a checklist line by ID.
    pub async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<ChecklistLineEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_checklist_line_by_id");

        let result = sqlx::query_as::<_, ChecklistLineEntity>(&format!(
            "SELECT {LINE_COLUMNS} FROM checklist_lines WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;

        timer.record();
        result
    }

    /// Get a checklist line by ID with a row lock.
    pub async fn lock_by_id(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<ChecklistLineEntity>, sqlx::Error> {
        let timer = QueryTimer::new("lock_checklist_line_by_id");

        let result = sqlx::query_as::<_, ChecklistLineEntity>(&format!(
            "SELECT {LINE_COLUMNS} FROM checklist_lines WHERE id = $1 FOR UPDATE",
        ))
        .bind(id)
        .fetch_optional(conn)
        .await;

        timer.record();
        result
    }

    /// Adjust the allocated counter by a signed delta.
    pub async fn adjust_allocated(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        delta: i32,
    ) -> Result<ChecklistLineEntity, sqlx::Error> {
        let timer = QueryTimer::new("adjust_checklist_line_allocated");

        let result = sqlx::query_as::<_, ChecklistLineEntity>(&format!(
            r#"
            UPDATE checklist_lines
            SET allocated_quantity = allocated_quantity + $2, updated_at = now()
            WHERE id = $1
            RETURNING {LINE_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(delta)
        .fetch_one(conn)
        .await;

        timer.record();
        result
    }

    /// List all checklist lines of an event.
    pub async fn list_for_event(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<ChecklistLineEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_checklist_lines_for_event");

        let result = sqlx::query_as::<_, ChecklistLineEntity>(&format!(
            "SELECT {LINE_COLUMNS} FROM checklist_lines WHERE event_id = $1 ORDER BY created_at",
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await;

        timer.record();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checklist_line_input_creation() {
        let input = ChecklistLineInput {
            event_id: Uuid::new_v4(),
            material_id: Uuid::new_v4(),
            required_quantity: 20,
        };

        assert_eq!(input.required_quantity, 20);
    }
}
