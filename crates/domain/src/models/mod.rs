//! Domain models for the event inventory backend.

pub mod allocation;
pub mod checklist;
pub mod ledger;
pub mod material;
pub mod serial;

pub use allocation::{Allocation, AllocationStatus, ReturnOutcome, ShipmentMode};
pub use checklist::ChecklistLine;
pub use ledger::{MovementKind, MovementLedgerEntry};
pub use material::{ControlMode, Material};
pub use serial::{Serial, SerialStatus};
