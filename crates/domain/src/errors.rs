//! Inventory error taxonomy.
//!
//! Every business-rule violation is a typed variant carrying the offending
//! identifiers so the presentation layer can render an actionable message.
//! Business errors are never retried; storage failures surface as
//! `StorageUnavailable` after the repository boundary exhausts its retries.

use thiserror::Error;
use uuid::Uuid;

use crate::models::allocation::{ReturnOutcome, ShipmentMode};
use crate::models::material::ControlMode;
use crate::models::serial::SerialStatus;

/// Errors returned by catalog, allocation and return operations.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("serial number '{number}' already exists for material {material_id}")]
    DuplicateSerialNumber { material_id: Uuid, number: String },

    #[error("material {material_id} is {actual}-controlled, operation requires {expected}")]
    WrongControlMode {
        material_id: Uuid,
        expected: ControlMode,
        actual: ControlMode,
    },

    #[error("serial '{number}' of material {material_id} is allocated to an event")]
    SerialInUse { material_id: Uuid, number: String },

    #[error("adjustment of {delta} would leave material {material_id} with negative stock")]
    NegativeStockViolation { material_id: Uuid, delta: i32 },

    #[error("serial '{number}' of material {material_id} is {status}, not available")]
    SerialUnavailable {
        material_id: Uuid,
        number: String,
        status: SerialStatus,
    },

    #[error("material {material_id} has {available} available, {requested} requested")]
    InsufficientStock {
        material_id: Uuid,
        available: i32,
        requested: i32,
    },

    #[error("shipment mode {mode} requires a {field}")]
    MissingModeMetadata {
        mode: ShipmentMode,
        field: &'static str,
    },

    #[error("allocation {allocation_id} is already returned and cannot be cancelled")]
    AllocationNotReversible { allocation_id: Uuid },

    #[error("allocation {allocation_id} has already been returned")]
    AlreadyReturned { allocation_id: Uuid },

    #[error("outcome {outcome} for allocation {allocation_id} requires a justification note")]
    MissingJustification {
        allocation_id: Uuid,
        outcome: ReturnOutcome,
    },

    #[error(
        "returned quantity {returned} is outside 0..={allocated} for allocation {allocation_id}"
    )]
    InvalidReturnedQuantity {
        allocation_id: Uuid,
        returned: i32,
        allocated: i32,
    },

    #[error("material {0} not found")]
    MaterialNotFound(Uuid),

    #[error("serial '{number}' not found for material {material_id}")]
    SerialNotFound { material_id: Uuid, number: String },

    #[error("checklist line {0} not found")]
    ChecklistLineNotFound(Uuid),

    #[error("allocation {0} not found")]
    AllocationNotFound(Uuid),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] sqlx::Error),
}

impl From<validator::ValidationErrors> for InventoryError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| {
                    let message = e
                        .message
                        .clone()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    format!("{field}: {message}")
                })
            })
            .collect();

        InventoryError::Validation(details.join("; "))
    }
}

impl InventoryError {
    /// Stable machine-readable kind for the presentation layer.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DuplicateSerialNumber { .. } => "duplicate_serial_number",
            Self::WrongControlMode { .. } => "wrong_control_mode",
            Self::SerialInUse { .. } => "serial_in_use",
            Self::NegativeStockViolation { .. } => "negative_stock_violation",
            Self::SerialUnavailable { .. } => "serial_unavailable",
            Self::InsufficientStock { .. } => "insufficient_stock",
            Self::MissingModeMetadata { .. } => "missing_mode_metadata",
            Self::AllocationNotReversible { .. } => "allocation_not_reversible",
            Self::AlreadyReturned { .. } => "already_returned",
            Self::MissingJustification { .. } => "missing_justification",
            Self::InvalidReturnedQuantity { .. } => "invalid_returned_quantity",
            Self::MaterialNotFound(_) => "material_not_found",
            Self::SerialNotFound { .. } => "serial_not_found",
            Self::ChecklistLineNotFound(_) => "checklist_line_not_found",
            Self::AllocationNotFound(_) => "allocation_not_found",
            Self::Validation(_) => "validation_error",
            Self::StorageUnavailable(_) => "storage_unavailable",
        }
    }

    /// True for violations of business rules, false for storage failures.
    ///
    /// Business errors are deterministic and must not be retried.
    pub fn is_business_error(&self) -> bool {
        !matches!(self, Self::StorageUnavailable(_))
    }
}
