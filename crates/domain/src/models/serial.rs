//! Serial domain model.
//!
//! One physically distinct unit of a serialized material. Status transitions
//! are driven exclusively by the allocation engine (to `InUse`) and the
//! return state machine (back to `Available`, or to `Maintenance`/`Lost`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

// ============================================================================
// Enums
// ============================================================================

/// Lifecycle status of a serialized unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SerialStatus {
    Available,
    InUse,
    Maintenance,
    Lost,
    Consumed,
}

impl SerialStatus {
    /// Returns the string representation for database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            SerialStatus::Available => "AVAILABLE",
            SerialStatus::InUse => "IN_USE",
            SerialStatus::Maintenance => "MAINTENANCE",
            SerialStatus::Lost => "LOST",
            SerialStatus::Consumed => "CONSUMED",
        }
    }

    /// Lost and consumed units never re-enter circulation; the record is
    /// retained for audit only.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SerialStatus::Lost | SerialStatus::Consumed)
    }
}

impl fmt::Display for SerialStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SerialStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AVAILABLE" => Ok(SerialStatus::Available),
            "IN_USE" => Ok(SerialStatus::InUse),
            "MAINTENANCE" => Ok(SerialStatus::Maintenance),
            "LOST" => Ok(SerialStatus::Lost),
            "CONSUMED" => Ok(SerialStatus::Consumed),
            _ => Err(format!(
                "Invalid serial status: {}. Must be one of: AVAILABLE, IN_USE, MAINTENANCE, LOST, CONSUMED",
                s
            )),
        }
    }
}

// ============================================================================
// Core Model
// ============================================================================

/// Represents one individually tracked unit of a serialized material.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Serial {
    pub id: Uuid,
    pub material_id: Uuid,
    pub serial_number: String,
    pub status: SerialStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub tags: Vec<String>,
    /// Set iff `status == InUse`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Serial {
    /// Invariant: `InUse` requires an event link, every other status
    /// requires its absence.
    pub fn event_link_consistent(&self) -> bool {
        match self.status {
            SerialStatus::InUse => self.event_id.is_some(),
            _ => self.event_id.is_none() && self.event_name.is_none(),
        }
    }
}

// ============================================================================
// Request DTOs
// ============================================================================

/// Request payload for registering a new serialized unit.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSerialRequest {
    #[validate(custom(function = "shared::validation::validate_serial_number"))]
    pub serial_number: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,
}
