//! Allocation entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::allocation::{Allocation, AllocationStatus, ReturnOutcome, ShipmentMode};

/// Database row mapping for the allocations table.
#[derive(Debug, Clone, FromRow)]
pub struct AllocationEntity {
    pub id: Uuid,
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
    pub status: String,
    pub return_outcome: Option<String>,
    pub returned_quantity: Option<i32>,
    pub return_notes: Option<String>,
    pub proof_refs: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
}

impl AllocationEntity {
    /// Convert to domain model.
    pub fn into_domain(self) -> Result<Allocation, sqlx::Error> {
        let shipment_mode = self
            .shipment_mode
            .parse::<ShipmentMode>()
            .map_err(|e| sqlx::Error::Decode(e.into()))?;

        let status = self
            .status
            .parse::<AllocationStatus>()
            .map_err(|e| sqlx::Error::Decode(e.into()))?;

        let return_outcome = self
            .return_outcome
            .map(|raw| raw.parse::<ReturnOutcome>())
            .transpose()
            .map_err(|e| sqlx::Error::Decode(e.into()))?;

        Ok(Allocation {
            id: self.id,
            event_id: self.event_id,
            event_name: self.event_name,
            checklist_line_id: self.checklist_line_id,
            material_id: self.material_id,
            serial_id: self.serial_id,
            serial_number: self.serial_number,
            quantity: self.quantity,
            shipment_mode,
            carrier_name: self.carrier_name,
            crew_member: self.crew_member,
            status,
            return_outcome,
            returned_quantity: self.returned_quantity,
            return_notes: self.return_notes,
            proof_refs: self.proof_refs,
            created_at: self.created_at,
            returned_at: self.returned_at,
        })
    }
}
