//! Domain layer for the event inventory backend.
//!
//! This crate contains:
//! - Domain models (Material, Serial, ChecklistLine, Allocation, ledger entries)
//! - Pure business logic services (return reconciliation, stock projections)
//! - The inventory error taxonomy

pub mod errors;
pub mod models;
pub mod services;

pub use errors::InventoryError;
