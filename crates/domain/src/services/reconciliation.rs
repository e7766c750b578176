//! Return reconciliation state machine.
//!
//! Converts a reserved allocation plus a requested outcome into an explicit
//! plan of inventory effects. The functions here are pure: they validate
//! preconditions and compute deltas, while the engine applies the plan and
//! the matching ledger entry inside one transaction.
//!
//! Outcome effects:
//!
//! | Outcome            | Serialized unit          | Quantity-mode stock                          |
//! |--------------------|--------------------------|----------------------------------------------|
//! | `ReturnedOk`       | status → `Available`     | `available += returned`, shortfall off `total` |
//! | `ReturnedDamaged`  | status → `Maintenance`   | no change (still unavailable)                |
//! | `Lost`             | status → `Lost`          | `total -= allocated`                         |
//! | `Consumed`         | not applicable           | `total -= allocated`                         |

use crate::errors::InventoryError;
use crate::models::allocation::{Allocation, ReturnOutcome};
use crate::models::ledger::MovementKind;
use crate::models::material::ControlMode;
use crate::models::serial::SerialStatus;

/// Effects of returning a serialized unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialReturnEffect {
    /// Status the serial transitions to; the event link is always cleared.
    pub new_status: SerialStatus,
    pub movement: MovementKind,
}

/// Effects of returning a quantity-mode allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityReturnEffect {
    /// Units restored to circulation.
    pub effective_returned: i32,
    /// Signed change applied to the material's available count.
    pub available_delta: i32,
    /// Signed change applied to the material's total count.
    pub total_delta: i32,
    pub movement: MovementKind,
}

/// Validated plan for resolving one allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnPlan {
    Serialized(SerialReturnEffect),
    Quantity(QuantityReturnEffect),
}

impl ReturnPlan {
    pub fn movement(&self) -> MovementKind {
        match self {
            ReturnPlan::Serialized(effect) => effect.movement,
            ReturnPlan::Quantity(effect) => effect.movement,
        }
    }

    /// Quantity recorded on the ledger entry for this return.
    pub fn ledger_quantity(&self, allocated: i32) -> i32 {
        match self {
            ReturnPlan::Serialized(_) => 1,
            ReturnPlan::Quantity(effect) => match effect.movement {
                MovementKind::ReturnOk => effect.effective_returned,
                _ => allocated,
            },
        }
    }
}

/// Validated plan for cancelling a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeallocationPlan {
    /// Release the serial back to `Available` and clear its event link.
    Serialized,
    /// Restore the allocated quantity to the material's available count.
    Quantity { available_delta: i32 },
}

/// Validates a return request against a reserved allocation and computes its
/// inventory effects.
///
/// `returned_quantity` is only accepted for quantity-mode allocations;
/// serialized returns are all-or-nothing and ignore it.
pub fn plan_return(
    allocation: &Allocation,
    control_mode: ControlMode,
    outcome: ReturnOutcome,
    notes: &str,
    returned_quantity: Option<i32>,
) -> Result<ReturnPlan, InventoryError> {
    if !allocation.is_reserved() {
        return Err(InventoryError::AlreadyReturned {
            allocation_id: allocation.id,
        });
    }

    if outcome.requires_justification() && !shared::validation::has_justification(notes) {
        return Err(InventoryError::MissingJustification {
            allocation_id: allocation.id,
            outcome,
        });
    }

    match control_mode {
        ControlMode::Serialized => plan_serialized(allocation, outcome).map(ReturnPlan::Serialized),
        ControlMode::Quantity => {
            plan_quantity(allocation, outcome, returned_quantity).map(ReturnPlan::Quantity)
        }
    }
}

fn plan_serialized(
    allocation: &Allocation,
    outcome: ReturnOutcome,
) -> Result<SerialReturnEffect, InventoryError> {
    let (new_status, movement) = match outcome {
        ReturnOutcome::ReturnedOk => (SerialStatus::Available, MovementKind::ReturnOk),
        ReturnOutcome::ReturnedDamaged => (SerialStatus::Maintenance, MovementKind::ReturnDamaged),
        ReturnOutcome::Lost => (SerialStatus::Lost, MovementKind::Loss),
        // Consumption only makes sense for bulk stock.
        ReturnOutcome::Consumed => {
            return Err(InventoryError::WrongControlMode {
                material_id: allocation.material_id,
                expected: ControlMode::Quantity,
                actual: ControlMode::Serialized,
            });
        }
    };

    Ok(SerialReturnEffect {
        new_status,
        movement,
    })
}

fn plan_quantity(
    allocation: &Allocation,
    outcome: ReturnOutcome,
    returned_quantity: Option<i32>,
) -> Result<QuantityReturnEffect, InventoryError> {
    let allocated = allocation.quantity;

    if let Some(returned) = returned_quantity {
        if returned < 0 || returned > allocated {
            return Err(InventoryError::InvalidReturnedQuantity {
                allocation_id: allocation.id,
                returned,
                allocated,
            });
        }
    }

    let effect = match outcome {
        ReturnOutcome::ReturnedOk => {
            let returned = returned_quantity.unwrap_or(allocated);
            // The shortfall never came back; it is treated as implicitly
            // consumed and leaves total stock for good.
            let shortfall = allocated - returned;
            QuantityReturnEffect {
                effective_returned: returned,
                available_delta: returned,
                total_delta: -shortfall,
                movement: MovementKind::ReturnOk,
            }
        }
        ReturnOutcome::ReturnedDamaged => QuantityReturnEffect {
            effective_returned: 0,
            available_delta: 0,
            total_delta: 0,
            movement: MovementKind::ReturnDamaged,
        },
        ReturnOutcome::Lost => QuantityReturnEffect {
            effective_returned: 0,
            available_delta: 0,
            total_delta: -allocated,
            movement: MovementKind::Loss,
        },
        ReturnOutcome::Consumed => QuantityReturnEffect {
            effective_returned: 0,
            available_delta: 0,
            total_delta: -allocated,
            movement: MovementKind::Consumption,
        },
    };

    Ok(effect)
}

/// Validates cancelling a reservation and computes the compensation.
///
/// Only legal while the allocation is still reserved; returned allocations
/// are immutable history.
pub fn plan_deallocation(
    allocation: &Allocation,
    control_mode: ControlMode,
) -> Result<DeallocationPlan, InventoryError> {
    if !allocation.is_reserved() {
        return Err(InventoryError::AllocationNotReversible {
            allocation_id: allocation.id,
        });
    }

    let plan = match control_mode {
        ControlMode::Serialized => DeallocationPlan::Serialized,
        ControlMode::Quantity => DeallocationPlan::Quantity {
            available_delta: allocation.quantity,
        },
    };

    Ok(plan)
}
