//! Checklist line entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::checklist::ChecklistLine;

/// Database row mapping for the checklist_lines table.
#[derive(Debug, Clone, FromRow)]
pub struct ChecklistLineEntity {
    pub id: Uuid,
    pub event_id: Uuid,
    pub material_id: Uuid,
    pub required_quantity: i32,
    pub allocated_quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChecklistLineEntity {
    /// Convert to domain model.
    pub fn into_domain(self) -> ChecklistLine {
        ChecklistLine {
            id: self.id,
            event_id: self.event_id,
            material_id: self.material_id,
            required_quantity: self.required_quantity,
            allocated_quantity: self.allocated_quantity,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl From<ChecklistLineEntity> for ChecklistLine {
    fn from(entity: ChecklistLineEntity) -> Self {
        entity.into_domain()
    }
}
