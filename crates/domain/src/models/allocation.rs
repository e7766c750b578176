//! Allocation domain model.
//!
//! An allocation binds inventory (a specific serial, or a quantity slice of a
//! bulk material) to an event under a shipment mode. Its lifecycle is
//! `Reserved` → `Returned` with a terminal outcome; cancellation while
//! reserved goes through deallocation, not through the state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

use crate::errors::InventoryError;

// ============================================================================
// Enums
// ============================================================================

/// How the reserved inventory travels to the event site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipmentMode {
    /// Shipped ahead of the crew by a named carrier.
    AdvanceShipment,
    /// Travels with the crew under a named responsible person.
    WithCrew,
}

impl ShipmentMode {
    /// Returns the string representation for database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentMode::AdvanceShipment => "ADVANCE_SHIPMENT",
            ShipmentMode::WithCrew => "WITH_CREW",
        }
    }
}

impl fmt::Display for ShipmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ShipmentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADVANCE_SHIPMENT" => Ok(ShipmentMode::AdvanceShipment),
            "WITH_CREW" => Ok(ShipmentMode::WithCrew),
            _ => Err(format!(
                "Invalid shipment mode: {}. Must be one of: ADVANCE_SHIPMENT, WITH_CREW",
                s
            )),
        }
    }
}

/// Lifecycle state of an allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AllocationStatus {
    Reserved,
    Returned,
}

impl AllocationStatus {
    /// Returns the string representation for database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            AllocationStatus::Reserved => "RESERVED",
            AllocationStatus::Returned => "RETURNED",
        }
    }
}

impl fmt::Display for AllocationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AllocationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RESERVED" => Ok(AllocationStatus::Reserved),
            "RETURNED" => Ok(AllocationStatus::Returned),
            _ => Err(format!(
                "Invalid allocation status: {}. Must be one of: RESERVED, RETURNED",
                s
            )),
        }
    }
}

/// Terminal sub-state of a returned allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReturnOutcome {
    /// Stock came back usable.
    ReturnedOk,
    /// Stock came back but needs repair before re-use.
    ReturnedDamaged,
    /// Stock never came back; written off.
    Lost,
    /// Bulk stock used up during the event; written off.
    Consumed,
}

impl ReturnOutcome {
    /// Returns the string representation for database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReturnOutcome::ReturnedOk => "RETURNED_OK",
            ReturnOutcome::ReturnedDamaged => "RETURNED_DAMAGED",
            ReturnOutcome::Lost => "LOST",
            ReturnOutcome::Consumed => "CONSUMED",
        }
    }

    /// Damaged and lost outcomes require a justification note.
    pub fn requires_justification(&self) -> bool {
        matches!(self, ReturnOutcome::ReturnedDamaged | ReturnOutcome::Lost)
    }
}

impl fmt::Display for ReturnOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ReturnOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RETURNED_OK" => Ok(ReturnOutcome::ReturnedOk),
            "RETURNED_DAMAGED" => Ok(ReturnOutcome::ReturnedDamaged),
            "LOST" => Ok(ReturnOutcome::Lost),
            "CONSUMED" => Ok(ReturnOutcome::Consumed),
            _ => Err(format!(
                "Invalid return outcome: {}. Must be one of: RETURNED_OK, RETURNED_DAMAGED, LOST, CONSUMED",
                s
            )),
        }
    }
}

// ============================================================================
// Core Model
// ============================================================================

/// A reservation binding inventory to an event for a shipment mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    pub id: Uuid,
    pub event_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    pub checklist_line_id: Uuid,
    pub material_id: Uuid,
    /// Set for serialized materials only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    /// Allocated quantity; always 1 for serialized units.
    pub quantity: i32,
    pub shipment_mode: ShipmentMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carrier_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crew_member: Option<String>,
    pub status: AllocationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_outcome: Option<ReturnOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returned_quantity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_notes: Option<String>,
    pub proof_refs: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returned_at: Option<DateTime<Utc>>,
}

impl Allocation {
    /// True while the reservation is open and return processing is legal.
    pub fn is_reserved(&self) -> bool {
        self.status == AllocationStatus::Reserved
    }

    /// True for allocations of serialized units.
    pub fn is_serialized(&self) -> bool {
        self.serial_id.is_some()
    }
}

// ============================================================================
// Request DTOs
// ============================================================================

/// What is being reserved: a specific serial or a quantity slice.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AllocationTarget {
    #[serde(rename_all = "camelCase")]
    Serial { serial_number: String },
    #[serde(rename_all = "camelCase")]
    Quantity { quantity: i32 },
}

/// Request payload for reserving inventory against a checklist line.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AllocateRequest {
    pub event_id: Uuid,

    /// Event name recorded on the serial link and ledger annotation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,

    pub checklist_line_id: Uuid,
    pub material_id: Uuid,

    pub target: AllocationTarget,

    pub shipment_mode: ShipmentMode,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub carrier_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub crew_member: Option<String>,
}

impl AllocateRequest {
    /// Checks mode-specific metadata: advance shipments need a carrier,
    /// with-crew allocations need a responsible person.
    pub fn validate_mode_metadata(&self) -> Result<(), InventoryError> {
        let present = |value: &Option<String>| {
            value.as_deref().is_some_and(|v| !v.trim().is_empty())
        };
        match self.shipment_mode {
            ShipmentMode::AdvanceShipment if !present(&self.carrier_name) => {
                Err(InventoryError::MissingModeMetadata {
                    mode: self.shipment_mode,
                    field: "carrier name",
                })
            }
            ShipmentMode::WithCrew if !present(&self.crew_member) => {
                Err(InventoryError::MissingModeMetadata {
                    mode: self.shipment_mode,
                    field: "responsible crew member",
                })
            }
            _ => Ok(()),
        }
    }
}

/// Request payload for resolving a reserved allocation to a terminal outcome.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterReturnRequest {
    pub outcome: ReturnOutcome,

    #[validate(custom(function = "shared::validation::validate_note_length"))]
    #[serde(default)]
    pub notes: String,

    #[validate(custom(function = "shared::validation::validate_proof_refs"))]
    #[serde(default)]
    pub proof_refs: Vec<String>,

    /// Quantity-mode allocations only; serialized returns are all-or-nothing
    /// and ignore this field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returned_quantity: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn allocate_request(
        mode: ShipmentMode,
        carrier: Option<&str>,
        crew: Option<&str>,
    ) -> AllocateRequest {
        AllocateRequest {
            event_id: Uuid::new_v4(),
            event_name: Some("Festival de Verão".to_string()),
            checklist_line_id: Uuid::new_v4(),
            material_id: Uuid::new_v4(),
            target: AllocationTarget::Quantity { quantity: 5 },
            shipment_mode: mode,
            carrier_name: carrier.map(String::from),
            crew_member: crew.map(String::from),
        }
    }

    // =========================================================================
    // Enum Round-trip Tests
    // =========================================================================

    #[test]
    fn test_shipment_mode_as_str() {
        assert_eq!(ShipmentMode::AdvanceShipment.as_str(), "ADVANCE_SHIPMENT");
        assert_eq!(ShipmentMode::WithCrew.as_str(), "WITH_CREW");
    }

    #[test]
    fn test_shipment_mode_from_str() {
        assert_eq!(
            "ADVANCE_SHIPMENT".parse::<ShipmentMode>().unwrap(),
            ShipmentMode::AdvanceShipment
        );
        assert_eq!(
            "WITH_CREW".parse::<ShipmentMode>().unwrap(),
            ShipmentMode::WithCrew
        );
        assert!("COURIER".parse::<ShipmentMode>().is_err());
    }

    #[test]
    fn test_allocation_status_from_str() {
        assert_eq!(
            "RESERVED".parse::<AllocationStatus>().unwrap(),
            AllocationStatus::Reserved
        );
        assert_eq!(
            "RETURNED".parse::<AllocationStatus>().unwrap(),
            AllocationStatus::Returned
        );
        assert!("OPEN".parse::<AllocationStatus>().is_err());
    }

    #[test]
    fn test_return_outcome_from_str() {
        assert_eq!(
            "RETURNED_OK".parse::<ReturnOutcome>().unwrap(),
            ReturnOutcome::ReturnedOk
        );
        assert_eq!(
            "RETURNED_DAMAGED".parse::<ReturnOutcome>().unwrap(),
            ReturnOutcome::ReturnedDamaged
        );
        assert_eq!("LOST".parse::<ReturnOutcome>().unwrap(), ReturnOutcome::Lost);
        assert_eq!(
            "CONSUMED".parse::<ReturnOutcome>().unwrap(),
            ReturnOutcome::Consumed
        );
        assert!("DESTROYED".parse::<ReturnOutcome>().is_err());
    }

    #[test]
    fn test_return_outcome_serde() {
        let json = serde_json::to_string(&ReturnOutcome::ReturnedDamaged).unwrap();
        assert_eq!(json, "\"RETURNED_DAMAGED\"");
    }

    #[test]
    fn test_return_outcome_justification() {
        assert!(ReturnOutcome::ReturnedDamaged.requires_justification());
        assert!(ReturnOutcome::Lost.requires_justification());
        assert!(!ReturnOutcome::ReturnedOk.requires_justification());
        assert!(!ReturnOutcome::Consumed.requires_justification());
    }

    // =========================================================================
    // Mode Metadata Tests
    // =========================================================================

    #[test]
    fn test_advance_shipment_requires_carrier() {
        let request = allocate_request(ShipmentMode::AdvanceShipment, None, None);
        let err = request.validate_mode_metadata().unwrap_err();
        assert_eq!(err.kind(), "missing_mode_metadata");

        let request = allocate_request(ShipmentMode::AdvanceShipment, Some("Transportes Silva"), None);
        assert!(request.validate_mode_metadata().is_ok());
    }

    #[test]
    fn test_with_crew_requires_responsible() {
        let request = allocate_request(ShipmentMode::WithCrew, None, None);
        assert!(request.validate_mode_metadata().is_err());

        let request = allocate_request(ShipmentMode::WithCrew, None, Some("Ana"));
        assert!(request.validate_mode_metadata().is_ok());
    }

    #[test]
    fn test_blank_metadata_rejected() {
        let request = allocate_request(ShipmentMode::WithCrew, None, Some("   "));
        assert!(request.validate_mode_metadata().is_err());
    }

    #[test]
    fn test_allocation_target_deserialization() {
        let serial: AllocationTarget =
            serde_json::from_str(r#"{"serialNumber": "SN-001"}"#).unwrap();
        assert_eq!(
            serial,
            AllocationTarget::Serial {
                serial_number: "SN-001".to_string()
            }
        );

        let quantity: AllocationTarget = serde_json::from_str(r#"{"quantity": 20}"#).unwrap();
        assert_eq!(quantity, AllocationTarget::Quantity { quantity: 20 });
    }

    // =========================================================================
    // Allocation Model Tests
    // =========================================================================

    #[test]
    fn test_allocation_predicates() {
        let allocation = Allocation {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            event_name: None,
            checklist_line_id: Uuid::new_v4(),
            material_id: Uuid::new_v4(),
            serial_id: Some(Uuid::new_v4()),
            serial_number: Some("SN-001".to_string()),
            quantity: 1,
            shipment_mode: ShipmentMode::WithCrew,
            carrier_name: None,
            crew_member: Some("Ana".to_string()),
            status: AllocationStatus::Reserved,
            return_outcome: None,
            returned_quantity: None,
            return_notes: None,
            proof_refs: vec![],
            created_at: Utc::now(),
            returned_at: None,
        };

        assert!(allocation.is_reserved());
        assert!(allocation.is_serialized());
    }

    #[test]
    fn test_register_return_request_validation() {
        let request = RegisterReturnRequest {
            outcome: ReturnOutcome::ReturnedOk,
            notes: String::new(),
            proof_refs: vec!["s3://proofs/1.jpg".to_string()],
            returned_quantity: Some(7),
        };
        assert!(request.validate().is_ok());

        let request = RegisterReturnRequest {
            outcome: ReturnOutcome::Lost,
            notes: "x".repeat(2001),
            proof_refs: vec![],
            returned_quantity: None,
        };
        assert!(request.validate().is_err());
    }
}
