//! Allocation repository for database operations.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::AllocationEntity;
use crate::metrics::QueryTimer;

const ALLOCATION_COLUMNS: &str = "id, event_id, event_name, checklist_line_id, material_id, \
     serial_id, serial_number, quantity, shipment_mode, carrier_name, crew_member, status, \
     return_outcome, returned_quantity, return_notes, proof_refs, created_at, returned_at";

/// Input data for inserting a reservation.
#[derive(Debug, Clone)]
pub struct AllocationInput {
    pub event_id: Uuid,
    pub event_name: Option<String>,
    pub checklist_line_id: Uuid,
    pub material_id: Uuid,
    pub serial_id: Option<Uuid>,
    pub serial_number: Option<String>,
    pub quantity: i32,
    pub shipment_mode: String,
    pub carrier_name: Option<String>,
    pub crew_member: Option<String>,
}

/// Input data for resolving a reservation to its terminal outcome.
#[derive(Debug, Clone)]
pub struct ReturnUpdateInput {
    pub outcome: String,
    pub returned_quantity: Option<i32>,
    pub notes: Option<String>,
    pub proof_refs: Vec<String>,
}

/// Repository for allocation database operations.
#[derive(Clone)]
pub struct AllocationRepository {
    pool: PgPool,
}

impl AllocationRepository {
    /// Creates a new AllocationRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a reservation.
    pub async fn insert(
        &self,
        conn: &mut PgConnection,
        input: AllocationInput,
    ) -> Result<AllocationEntity, sqlx::Error> {
        let timer = QueryTimer::new("insert_allocation");

        let result = sqlx::query_as::<_, AllocationEntity>(&format!(
            r#"
            INSERT INTO allocations (
                event_id, event_name, checklist_line_id, material_id, serial_id,
                serial_number, quantity, shipment_mode, carrier_name, crew_member
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {ALLOCATION_COLUMNS}
            "#,
        ))
        .bind(input.event_id)
        .bind(&input.event_name)
        .bind(input.checklist_line_id)
        .bind(input.material_id)
        .bind(input.serial_id)
        .bind(&input.serial_number)
        .bind(input.quantity)
        .bind(&input.shipment_mode)
        .bind(&input.carrier_name)
        .bind(&input.crew_member)
        .fetch_one(conn)
        .await;

        timer.record();
        result
    }

    /// Get an allocation by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<AllocationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_allocation_by_id");

        let result = sqlx::query_as::<_, AllocationEntity>(&format!(
            "SELECT {ALLOCATION_COLUMNS} FROM allocations WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;

        timer.record();
        result
    }

    /// Get an allocation by ID with a row lock.
    ///
    /// Return processing and cancellation both lock the row first so a
    /// concurrent second return observes the terminal status.
    pub async fn lock_by_id(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<AllocationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("lock_allocation_by_id");

        let result = sqlx::query_as::<_, AllocationEntity>(&format!(
            "SELECT {ALLOCATION_COLUMNS} FROM allocations WHERE id = $1 FOR UPDATE",
        ))
        .bind(id)
        .fetch_optional(conn)
        .await;

        timer.record();
        result
    }

    /// Mark a reservation returned with its terminal outcome.
    pub async fn mark_returned(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        input: ReturnUpdateInput,
    ) -> Result<AllocationEntity, sqlx::Error> {
        let timer = QueryTimer::new("mark_allocation_returned");

        let result = sqlx::query_as::<_, AllocationEntity>(&format!(
            r#"
            UPDATE allocations
            SET status = 'RETURNED',
                return_outcome = $2,
                returned_quantity = $3,
                return_notes = $4,
                proof_refs = $5,
                returned_at = now()
            WHERE id = $1
            RETURNING {ALLOCATION_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(&input.outcome)
        .bind(input.returned_quantity)
        .bind(&input.notes)
        .bind(&input.proof_refs)
        .fetch_one(conn)
        .await;

        timer.record();
        result
    }

    /// Remove a cancelled reservation. Returns the number of deleted rows.
    pub async fn delete(&self, conn: &mut PgConnection, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_allocation");

        let result = sqlx::query("DELETE FROM allocations WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;

        timer.record();
        Ok(result.rows_affected())
    }

    /// List all allocations of an event, oldest first.
    pub async fn list_for_event(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<AllocationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_allocations_for_event");

        let result = sqlx::query_as::<_, AllocationEntity>(&format!(
            "SELECT {ALLOCATION_COLUMNS} FROM allocations WHERE event_id = $1 ORDER BY created_at, id",
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await;

        timer.record();
        result
    }

    /// List open reservations of a material.
    pub async fn list_open_for_material(
        &self,
        material_id: Uuid,
    ) -> Result<Vec<AllocationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_open_allocations_for_material");

        let result = sqlx::query_as::<_, AllocationEntity>(&format!(
            r#"
            SELECT {ALLOCATION_COLUMNS} FROM allocations
            WHERE material_id = $1 AND status = 'RESERVED'
            ORDER BY created_at, id
            "#,
        ))
        .bind(material_id)
        .fetch_all(&self.pool)
        .await;

        timer.record();
        result
    }
}
