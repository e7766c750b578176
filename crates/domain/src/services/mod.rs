//! Domain services for the event inventory backend.
//!
//! Services contain business logic that operates on domain models without
//! touching storage. The engine crate executes the plans they produce inside
//! database transactions.

pub mod projection;
pub mod reconciliation;

pub use projection::{
    checklist_progress, pending_returns, serial_status_counts, sort_serials_for_allocation,
    summarize_stock, ChecklistProgress, SerialStatusCounts, StockSummary,
};

pub use reconciliation::{
    plan_deallocation, plan_return, DeallocationPlan, QuantityReturnEffect, ReturnPlan,
    SerialReturnEffect,
};
