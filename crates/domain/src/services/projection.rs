//! Read-side projections over catalog and allocation state.
//!
//! Pure functions only: they derive availability counts and views from
//! already-loaded rows and never mutate anything.

use serde::Serialize;
use uuid::Uuid;

use crate::models::allocation::Allocation;
use crate::models::checklist::ChecklistLine;
use crate::models::material::{ControlMode, Material};
use crate::models::serial::{Serial, SerialStatus};

/// Per-status counts of a material's serials.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SerialStatusCounts {
    pub total: i32,
    pub available: i32,
    pub in_use: i32,
    pub maintenance: i32,
    pub lost: i32,
    pub consumed: i32,
}

/// Aggregate stock view of one material.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockSummary {
    pub material_id: Uuid,
    pub name: String,
    pub control_mode: ControlMode,
    pub total: i32,
    pub available: i32,
    /// In-use serials, or outstanding reserved quantity for bulk stock.
    pub reserved: i32,
    /// Serialized units awaiting repair. Always 0 for quantity materials.
    pub maintenance: i32,
    /// Lost plus consumed units. Always 0 for quantity materials, whose
    /// write-offs already left `total`.
    pub written_off: i32,
}

/// Fulfillment view of one checklist line.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistProgress {
    pub checklist_line_id: Uuid,
    pub material_id: Uuid,
    pub required: i32,
    pub allocated: i32,
    pub remaining: i32,
    pub fulfilled: bool,
    pub over_allocated: bool,
}

/// Sorts serials for the allocation picker: available units first, then
/// lexicographically by serial number within each group.
pub fn sort_serials_for_allocation(mut serials: Vec<Serial>) -> Vec<Serial> {
    serials.sort_by(|a, b| {
        let a_key = a.status != SerialStatus::Available;
        let b_key = b.status != SerialStatus::Available;
        a_key
            .cmp(&b_key)
            .then_with(|| a.serial_number.cmp(&b.serial_number))
    });
    serials
}

/// Counts a material's serials by status.
pub fn serial_status_counts(serials: &[Serial]) -> SerialStatusCounts {
    let mut counts = SerialStatusCounts::default();
    for serial in serials {
        counts.total += 1;
        match serial.status {
            SerialStatus::Available => counts.available += 1,
            SerialStatus::InUse => counts.in_use += 1,
            SerialStatus::Maintenance => counts.maintenance += 1,
            SerialStatus::Lost => counts.lost += 1,
            SerialStatus::Consumed => counts.consumed += 1,
        }
    }
    counts
}

/// Builds the aggregate stock view for one material.
///
/// Serialized materials derive every number from their serials; the counters
/// stored on the material row are ignored. Quantity materials use the stored
/// counters plus the outstanding reserved quantity from open allocations.
pub fn summarize_stock(
    material: &Material,
    serials: &[Serial],
    open_allocations: &[Allocation],
) -> StockSummary {
    match material.control_mode {
        ControlMode::Serialized => {
            let counts = serial_status_counts(serials);
            StockSummary {
                material_id: material.id,
                name: material.name.clone(),
                control_mode: material.control_mode,
                total: counts.total,
                available: counts.available,
                reserved: counts.in_use,
                maintenance: counts.maintenance,
                written_off: counts.lost + counts.consumed,
            }
        }
        ControlMode::Quantity => {
            let reserved: i32 = open_allocations
                .iter()
                .filter(|a| a.is_reserved() && a.material_id == material.id)
                .map(|a| a.quantity)
                .sum();
            StockSummary {
                material_id: material.id,
                name: material.name.clone(),
                control_mode: material.control_mode,
                total: material.total_quantity,
                available: material.available_quantity,
                reserved,
                maintenance: 0,
                written_off: 0,
            }
        }
    }
}

/// Filters the allocations still awaiting return processing, oldest first.
pub fn pending_returns(allocations: &[Allocation]) -> Vec<Allocation> {
    let mut pending: Vec<Allocation> = allocations
        .iter()
        .filter(|a| a.is_reserved())
        .cloned()
        .collect();
    pending.sort_by_key(|a| a.created_at);
    pending
}

/// Computes fulfillment progress for an event's checklist lines.
pub fn checklist_progress(lines: &[ChecklistLine]) -> Vec<ChecklistProgress> {
    lines
        .iter()
        .map(|line| ChecklistProgress {
            checklist_line_id: line.id,
            material_id: line.material_id,
            required: line.required_quantity,
            allocated: line.allocated_quantity,
            remaining: line.remaining(),
            fulfilled: line.is_fulfilled(),
            over_allocated: line.is_over_allocated(),
        })
        .collect()
}
