//! Movement ledger entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::ledger::{MovementKind, MovementLedgerEntry};

/// Database row mapping for the ledger_entries table.
#[derive(Debug, Clone, FromRow)]
pub struct LedgerEntryEntity {
    pub id: Uuid,
    pub material_id: Uuid,
    pub serial_id: Option<Uuid>,
    pub serial_number: Option<String>,
    pub operation: String,
    pub quantity: i32,
    pub reason: Option<String>,
    pub proof_refs: Vec<String>,
    pub event_id: Option<Uuid>,
    pub event_name: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl LedgerEntryEntity {
    /// Convert to domain model.
    pub fn into_domain(self) -> Result<MovementLedgerEntry, sqlx::Error> {
        let operation = self
            .operation
            .parse::<MovementKind>()
            .map_err(|e| sqlx::Error::Decode(e.into()))?;

        Ok(MovementLedgerEntry {
            id: self.id,
            material_id: self.material_id,
            serial_id: self.serial_id,
            serial_number: self.serial_number,
            operation,
            quantity: self.quantity,
            reason: self.reason,
            proof_refs: self.proof_refs,
            event_id: self.event_id,
            event_name: self.event_name,
            recorded_at: self.recorded_at,
        })
    }
}
