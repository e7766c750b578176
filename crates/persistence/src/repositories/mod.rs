//! Repository implementations for database operations.
//!
//! Reads go through the pool; mutations that participate in a larger unit of
//! work take a `&mut PgConnection` so the service layer can run the whole
//! read-check-write sequence inside one transaction.

pub mod allocation;
pub mod checklist_line;
pub mod ledger;
pub mod material;
pub mod serial;

pub use allocation::{AllocationInput, AllocationRepository, ReturnUpdateInput};
pub use checklist_line::{ChecklistLineInput, ChecklistLineRepository};
pub use ledger::{LedgerEntryInput, LedgerQuery, LedgerRepository};
pub use material::{MaterialInput, MaterialRepository};
pub use serial::{SerialInput, SerialRepository};
