//! Material repository for database operations.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::MaterialEntity;
use crate::metrics::QueryTimer;

const MATERIAL_COLUMNS: &str = "id, name, category, control_mode, total_quantity, \
     available_quantity, description, created_at, updated_at";

/// Input data for inserting a catalog entry.
#[derive(Debug, Clone)]
pub struct MaterialInput {
    pub name: String,
    pub category: String,
    pub control_mode: String,
    pub initial_quantity: i32,
    pub description: Option<String>,
}

/// Repository for material database operations.
#[derive(Clone)]
pub struct MaterialRepository {
    pool: PgPool,
}

impl MaterialRepository {
    /// Creates a new MaterialRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new catalog entry.
    ///
    /// Quantity materials start with `initial_quantity` in stock; serialized
    /// materials start at zero and grow by registering serials.
    pub async fn insert(
        &self,
        conn: &mut PgConnection,
        input: MaterialInput,
    ) -> Result<MaterialEntity, sqlx::Error> {
        let timer = QueryTimer::new("insert_material");

        let result = sqlx::query_as::<_, MaterialEntity>(&format!(
            r#"
            INSERT INTO materials (name, category, control_mode, total_quantity, available_quantity, description)
            VALUES ($1, $2, $3, $4, $4, $5)
            RETURNING {MATERIAL_COLUMNS}
            "#,
        ))
        .bind(&input.name)
        .bind(&input.category)
        .bind(&input.control_mode)
        .bind(input.initial_quantity)
        .bind(&input.description)
        .fetch_one(conn)
        .await;

        timer.record();
        result
    }

    /// Get a material by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<MaterialEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_material_by_id");

        let result = sqlx::query_as::<_, MaterialEntity>(&format!(
            "SELECT {MATERIAL_COLUMNS} FROM materials WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;

        timer.record();
        result
    }

    /// Get a material by ID with a row lock, serializing concurrent
    /// allocation and return operations on the same material.
    pub async fn lock_by_id(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<MaterialEntity>, sqlx::Error> {
        let timer = QueryTimer::new("lock_material_by_id");

        let result = sqlx::query_as::<_, MaterialEntity>(&format!(
            "SELECT {MATERIAL_COLUMNS} FROM materials WHERE id = $1 FOR UPDATE",
        ))
        .bind(id)
        .fetch_optional(conn)
        .await;

        timer.record();
        result
    }

    /// Apply signed deltas to a quantity material's counters.
    ///
    /// Callers validate bounds beforehand while holding the row lock; the
    /// CHECK constraint is the final guard.
    pub async fn apply_stock_delta(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        available_delta: i32,
        total_delta: i32,
    ) -> Result<MaterialEntity, sqlx::Error> {
        let timer = QueryTimer::new("apply_material_stock_delta");

        let result = sqlx::query_as::<_, MaterialEntity>(&format!(
            r#"
            UPDATE materials
            SET available_quantity = available_quantity + $2,
                total_quantity = total_quantity + $3,
                updated_at = now()
            WHERE id = $1
            RETURNING {MATERIAL_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(available_delta)
        .bind(total_delta)
        .fetch_one(conn)
        .await;

        timer.record();
        result
    }
}
