//! Movement ledger domain model.
//!
//! The ledger is the single append-only audit trail of every stock-affecting
//! operation. Entries reference materials and serials weakly by identifier;
//! corrections are made with new compensating entries, never by mutation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Kind of stock-affecting operation recorded on the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementKind {
    Allocation,
    Deallocation,
    ReturnOk,
    ReturnDamaged,
    Loss,
    Consumption,
    StockEntry,
    StockExit,
    Adjustment,
}

impl MovementKind {
    /// Returns the string representation for database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Allocation => "ALLOCATION",
            MovementKind::Deallocation => "DEALLOCATION",
            MovementKind::ReturnOk => "RETURN_OK",
            MovementKind::ReturnDamaged => "RETURN_DAMAGED",
            MovementKind::Loss => "LOSS",
            MovementKind::Consumption => "CONSUMPTION",
            MovementKind::StockEntry => "STOCK_ENTRY",
            MovementKind::StockExit => "STOCK_EXIT",
            MovementKind::Adjustment => "ADJUSTMENT",
        }
    }
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for MovementKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ALLOCATION" => Ok(MovementKind::Allocation),
            "DEALLOCATION" => Ok(MovementKind::Deallocation),
            "RETURN_OK" => Ok(MovementKind::ReturnOk),
            "RETURN_DAMAGED" => Ok(MovementKind::ReturnDamaged),
            "LOSS" => Ok(MovementKind::Loss),
            "CONSUMPTION" => Ok(MovementKind::Consumption),
            "STOCK_ENTRY" => Ok(MovementKind::StockEntry),
            "STOCK_EXIT" => Ok(MovementKind::StockExit),
            "ADJUSTMENT" => Ok(MovementKind::Adjustment),
            _ => Err(format!("Invalid movement kind: {}", s)),
        }
    }
}

/// Append-only audit record of one stock-affecting state change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementLedgerEntry {
    pub id: Uuid,
    pub material_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    pub operation: MovementKind,
    pub quantity: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub proof_refs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    pub recorded_at: DateTime<Utc>,
}
