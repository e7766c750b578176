//! Material domain model.
//!
//! A material is one catalog entry of equipment. Serialized materials track
//! physically distinct units (see [`crate::models::serial`]); quantity
//! materials track bulk counts on the material row itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

// ============================================================================
// Enums
// ============================================================================

/// How stock of a material is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlMode {
    /// Physically distinct, individually tracked units.
    Serialized,
    /// Bulk counts without per-unit identity.
    Quantity,
}

impl ControlMode {
    /// Returns the string representation for database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlMode::Serialized => "SERIALIZED",
            ControlMode::Quantity => "QUANTITY",
        }
    }
}

impl fmt::Display for ControlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ControlMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SERIALIZED" => Ok(ControlMode::Serialized),
            "QUANTITY" => Ok(ControlMode::Quantity),
            _ => Err(format!(
                "Invalid control mode: {}. Must be one of: SERIALIZED, QUANTITY",
                s
            )),
        }
    }
}

// ============================================================================
// Core Model
// ============================================================================

/// Represents one kind of equipment in the catalog.
///
/// For `Quantity` materials, `total_quantity` and `available_quantity` are
/// authoritative. For `Serialized` materials they are derived by counting the
/// associated serials and must not be read from the row directly; the
/// projection layer recomputes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub control_mode: ControlMode,
    pub total_quantity: i32,
    pub available_quantity: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Material {
    /// Invariant: `0 <= available <= total` for quantity-controlled stock.
    pub fn quantity_invariant_holds(&self) -> bool {
        0 <= self.available_quantity && self.available_quantity <= self.total_quantity
    }
}

// ============================================================================
// Request DTOs
// ============================================================================

/// Request payload for creating a catalog entry.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMaterialRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(length(min = 1, max = 100))]
    pub category: String,

    pub control_mode: ControlMode,

    /// Initial stock for quantity materials. Ignored for serialized ones,
    /// whose stock is built up by registering serials.
    #[validate(custom(function = "shared::validation::validate_non_negative_quantity"))]
    #[serde(default)]
    pub initial_quantity: i32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Request payload for a manual stock adjustment of a quantity material.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdjustQuantityRequest {
    /// Signed delta: positive registers stock entry, negative stock exit.
    pub delta: i32,

    /// Free-text reason recorded verbatim on the ledger.
    #[validate(length(min = 1), custom(function = "shared::validation::validate_note_length"))]
    pub reason: String,
}
