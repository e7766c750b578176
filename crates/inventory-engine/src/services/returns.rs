//! Return service: resolving reservations to terminal outcomes.
//!
//! The four outcomes and their inventory effects are computed by the pure
//! state machine in `domain::services::reconciliation`; this service applies
//! the resulting plan atomically.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use domain::models::allocation::{Allocation, RegisterReturnRequest, ReturnOutcome};
use domain::services::reconciliation::{plan_return, ReturnPlan};
use domain::InventoryError;

use persistence::repositories::{
    AllocationRepository, LedgerEntryInput, LedgerRepository, MaterialRepository, ReturnUpdateInput,
    SerialRepository,
};

use super::with_tx_retry;

/// Per-item outcome of a batch return.
#[derive(Debug)]
pub struct BatchReturnItem {
    pub allocation_id: Uuid,
    pub result: Result<Allocation, InventoryError>,
}

impl BatchReturnItem {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Converts reserved allocations into returned ones.
#[derive(Clone)]
pub struct ReturnService {
    pool: PgPool,
    materials: MaterialRepository,
    serials: SerialRepository,
    allocations: AllocationRepository,
    ledger: LedgerRepository,
}

impl ReturnService {
    /// Creates a new ReturnService on the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            materials: MaterialRepository::new(pool.clone()),
            serials: SerialRepository::new(pool.clone()),
            allocations: AllocationRepository::new(pool.clone()),
            ledger: LedgerRepository::new(pool.clone()),
            pool,
        }
    }

    /// Resolve one reserved allocation to a terminal outcome.
    ///
    /// All inventory effects and the ledger append happen in one transaction:
    /// either everything commits or nothing does.
    pub async fn register_return(
        &self,
        allocation_id: Uuid,
        request: RegisterReturnRequest,
    ) -> Result<Allocation, InventoryError> {
        request.validate()?;
        let request = &request;
        with_tx_retry("register_return", move || {
            self.try_register_return(allocation_id, request)
        })
        .await
    }

    async fn try_register_return(
        &self,
        allocation_id: Uuid,
        request: &RegisterReturnRequest,
    ) -> Result<Allocation, InventoryError> {
        let mut tx = self.pool.begin().await?;

        let allocation = self
            .allocations
            .lock_by_id(&mut tx, allocation_id)
            .await?
            .ok_or(InventoryError::AllocationNotFound(allocation_id))?
            .into_domain()?;

        let material = self
            .materials
            .lock_by_id(&mut tx, allocation.material_id)
            .await?
            .ok_or(InventoryError::MaterialNotFound(allocation.material_id))?
            .into_domain()?;

        let plan = plan_return(
            &allocation,
            material.control_mode,
            request.outcome,
            &request.notes,
            request.returned_quantity,
        )?;

        let stored_returned_quantity = match &plan {
            ReturnPlan::Serialized(effect) => {
                let serial_id = allocation.serial_id.ok_or_else(|| {
                    InventoryError::StorageUnavailable(sqlx::Error::Decode(
                        "serialized allocation has no serial reference".into(),
                    ))
                })?;
                self.serials
                    .release(&mut tx, serial_id, effect.new_status.as_str())
                    .await?;
                None
            }
            ReturnPlan::Quantity(effect) => {
                if effect.available_delta != 0 || effect.total_delta != 0 {
                    self.materials
                        .apply_stock_delta(
                            &mut tx,
                            material.id,
                            effect.available_delta,
                            effect.total_delta,
                        )
                        .await?;
                }
                Some(effect.effective_returned)
            }
        };

        let notes = (!request.notes.trim().is_empty()).then(|| request.notes.clone());

        let entity = self
            .allocations
            .mark_returned(
                &mut tx,
                allocation.id,
                ReturnUpdateInput {
                    outcome: request.outcome.as_str().to_string(),
                    returned_quantity: stored_returned_quantity,
                    notes: notes.clone(),
                    proof_refs: request.proof_refs.clone(),
                },
            )
            .await?;

        self.ledger
            .append(
                &mut tx,
                LedgerEntryInput {
                    material_id: material.id,
                    serial_id: allocation.serial_id,
                    serial_number: allocation.serial_number.clone(),
                    operation: plan.movement().as_str().to_string(),
                    quantity: plan.ledger_quantity(allocation.quantity),
                    reason: notes,
                    proof_refs: request.proof_refs.clone(),
                    event_id: Some(allocation.event_id),
                    event_name: allocation.event_name.clone(),
                },
            )
            .await?;

        tx.commit().await?;

        info!(
            %allocation_id,
            material_id = %material.id,
            outcome = %request.outcome,
            "return registered"
        );
        entity.into_domain().map_err(Into::into)
    }

    /// Apply one shared outcome to a set of allocations, best effort.
    ///
    /// Items are processed independently: a failure on one allocation is
    /// recorded in its result and does not abort the siblings, whose effects
    /// stay committed.
    pub async fn register_return_batch(
        &self,
        allocation_ids: &[Uuid],
        outcome: ReturnOutcome,
        notes: &str,
        proof_refs: &[String],
    ) -> Vec<BatchReturnItem> {
        let mut items = Vec::with_capacity(allocation_ids.len());

        for &allocation_id in allocation_ids {
            let request = RegisterReturnRequest {
                outcome,
                notes: notes.to_string(),
                proof_refs: proof_refs.to_vec(),
                returned_quantity: None,
            };

            let result = self.register_return(allocation_id, request).await;
            if let Err(err) = &result {
                tracing::warn!(
                    %allocation_id,
                    error = %err,
                    "batch return item failed"
                );
            }
            items.push(BatchReturnItem {
                allocation_id,
                result,
            });
        }

        let failed = items.iter().filter(|i| !i.is_success()).count();
        info!(
            total = items.len(),
            failed,
            outcome = %outcome,
            "batch return processed"
        );
        items
    }
}
