//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod allocation;
pub mod checklist_line;
pub mod ledger_entry;
pub mod material;
pub mod serial;

pub use allocation::AllocationEntity;
pub use checklist_line::ChecklistLineEntity;
pub use ledger_entry::LedgerEntryEntity;
pub use material::MaterialEntity;
pub use serial::SerialEntity;
