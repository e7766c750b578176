//! Checklist line domain model.
//!
//! A checklist line states "N units of material X are required" for one
//! event. The allocated counter is maintained transactionally by the
//! allocation engine; `allocated <= required` is a soft limit only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// An event's stated requirement for a quantity of one material.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistLine {
    pub id: Uuid,
    pub event_id: Uuid,
    pub material_id: Uuid,
    pub required_quantity: i32,
    pub allocated_quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChecklistLine {
    /// Units still missing to satisfy the requirement. Never negative.
    pub fn remaining(&self) -> i32 {
        (self.required_quantity - self.allocated_quantity).max(0)
    }

    /// True once allocations exceed the stated requirement.
    ///
    /// Over-allocation is warned about, not rejected.
    pub fn is_over_allocated(&self) -> bool {
        self.allocated_quantity > self.required_quantity
    }

    pub fn is_fulfilled(&self) -> bool {
        self.allocated_quantity >= self.required_quantity
    }
}

/// Request payload for adding a requirement line to an event checklist.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateChecklistLineRequest {
    pub event_id: Uuid,
    pub material_id: Uuid,

    #[validate(custom(function = "shared::validation::validate_positive_quantity"))]
    pub required_quantity: i32,
}
