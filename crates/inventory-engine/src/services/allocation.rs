//! Allocation service: reserving inventory against event checklists.

use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use domain::models::allocation::{Allocation, AllocateRequest, AllocationTarget};
use domain::models::ledger::MovementKind;
use domain::models::material::ControlMode;
use domain::models::serial::SerialStatus;
use domain::services::reconciliation::{plan_deallocation, DeallocationPlan};
use domain::InventoryError;

use persistence::entities::SerialEntity;
use persistence::repositories::{
    AllocationInput, AllocationRepository, ChecklistLineRepository, LedgerEntryInput,
    LedgerRepository, MaterialRepository, SerialRepository,
};

use super::with_tx_retry;

/// Reserves serials and quantity slices to events, and cancels open
/// reservations.
#[derive(Clone)]
pub struct AllocationService {
    pool: PgPool,
    materials: MaterialRepository,
    serials: SerialRepository,
    lines: ChecklistLineRepository,
    allocations: AllocationRepository,
    ledger: LedgerRepository,
}

impl AllocationService {
    /// Creates a new AllocationService on the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            materials: MaterialRepository::new(pool.clone()),
            serials: SerialRepository::new(pool.clone()),
            lines: ChecklistLineRepository::new(pool.clone()),
            allocations: AllocationRepository::new(pool.clone()),
            ledger: LedgerRepository::new(pool.clone()),
            pool,
        }
    }

    /// Reserve inventory against a checklist line.
    ///
    /// Serialized materials need an available serial; quantity materials need
    /// sufficient stock, re-checked inside the transaction. Exceeding the
    /// line's required quantity is warned about, never rejected.
    pub async fn allocate(&self, request: AllocateRequest) -> Result<Allocation, InventoryError> {
        request.validate()?;
        request.validate_mode_metadata()?;
        let request = &request;
        with_tx_retry("allocate", move || self.try_allocate(request)).await
    }

    async fn try_allocate(
        &self,
        request: &AllocateRequest,
    ) -> Result<Allocation, InventoryError> {
        let mut tx = self.pool.begin().await?;

        let material = self
            .materials
            .lock_by_id(&mut tx, request.material_id)
            .await?
            .ok_or(InventoryError::MaterialNotFound(request.material_id))?
            .into_domain()?;

        let line = self
            .lines
            .lock_by_id(&mut tx, request.checklist_line_id)
            .await?
            .ok_or(InventoryError::ChecklistLineNotFound(
                request.checklist_line_id,
            ))?
            .into_domain();

        let (reserved_serial, quantity) = match (&request.target, material.control_mode) {
            (AllocationTarget::Serial { serial_number }, ControlMode::Serialized) => {
                let serial = self
                    .reserve_serial(&mut tx, request, serial_number)
                    .await?;
                (Some(serial), 1)
            }
            (AllocationTarget::Quantity { quantity }, ControlMode::Quantity) => {
                if *quantity <= 0 {
                    return Err(InventoryError::Validation(
                        "allocation quantity must be greater than zero".to_string(),
                    ));
                }
                if material.available_quantity < *quantity {
                    return Err(InventoryError::InsufficientStock {
                        material_id: material.id,
                        available: material.available_quantity,
                        requested: *quantity,
                    });
                }
                self.materials
                    .apply_stock_delta(&mut tx, material.id, -quantity, 0)
                    .await?;
                (None, *quantity)
            }
            (AllocationTarget::Serial { .. }, ControlMode::Quantity) => {
                return Err(InventoryError::WrongControlMode {
                    material_id: material.id,
                    expected: ControlMode::Serialized,
                    actual: ControlMode::Quantity,
                });
            }
            (AllocationTarget::Quantity { .. }, ControlMode::Serialized) => {
                return Err(InventoryError::WrongControlMode {
                    material_id: material.id,
                    expected: ControlMode::Quantity,
                    actual: ControlMode::Serialized,
                });
            }
        };

        let entity = self
            .allocations
            .insert(
                &mut tx,
                AllocationInput {
                    event_id: request.event_id,
                    event_name: request.event_name.clone(),
                    checklist_line_id: line.id,
                    material_id: material.id,
                    serial_id: reserved_serial.as_ref().map(|s| s.id),
                    serial_number: reserved_serial.as_ref().map(|s| s.serial_number.clone()),
                    quantity,
                    shipment_mode: request.shipment_mode.as_str().to_string(),
                    carrier_name: request.carrier_name.clone(),
                    crew_member: request.crew_member.clone(),
                },
            )
            .await?;

        let updated_line = self
            .lines
            .adjust_allocated(&mut tx, line.id, quantity)
            .await?
            .into_domain();

        if updated_line.is_over_allocated() {
            warn!(
                checklist_line_id = %updated_line.id,
                allocated = updated_line.allocated_quantity,
                required = updated_line.required_quantity,
                "checklist line allocated beyond requirement"
            );
        }

        self.ledger
            .append(
                &mut tx,
                LedgerEntryInput {
                    material_id: material.id,
                    serial_id: entity.serial_id,
                    serial_number: entity.serial_number.clone(),
                    operation: MovementKind::Allocation.as_str().to_string(),
                    quantity,
                    reason: None,
                    proof_refs: vec![],
                    event_id: Some(request.event_id),
                    event_name: request.event_name.clone(),
                },
            )
            .await?;

        tx.commit().await?;

        info!(
            allocation_id = %entity.id,
            material_id = %material.id,
            event_id = %request.event_id,
            quantity,
            "inventory allocated"
        );
        entity.into_domain().map_err(Into::into)
    }

    async fn reserve_serial(
        &self,
        conn: &mut sqlx::PgConnection,
        request: &AllocateRequest,
        serial_number: &str,
    ) -> Result<SerialEntity, InventoryError> {
        let serial = self
            .serials
            .lock_by_number(conn, request.material_id, serial_number)
            .await?
            .ok_or_else(|| InventoryError::SerialNotFound {
                material_id: request.material_id,
                number: serial_number.to_string(),
            })?
            .into_domain()?;

        if serial.status != SerialStatus::Available {
            return Err(InventoryError::SerialUnavailable {
                material_id: request.material_id,
                number: serial.serial_number,
                status: serial.status,
            });
        }

        let updated = self
            .serials
            .mark_in_use(conn, serial.id, request.event_id, request.event_name.as_deref())
            .await?;

        Ok(updated)
    }

    /// Cancel an open reservation, restoring the serial or quantity and the
    /// checklist counter. Returned allocations are immutable history.
    pub async fn deallocate(&self, allocation_id: Uuid) -> Result<(), InventoryError> {
        with_tx_retry("deallocate", || self.try_deallocate(allocation_id)).await
    }

    async fn try_deallocate(&self, allocation_id: Uuid) -> Result<(), InventoryError> {
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

        let plan = plan_deallocation(&allocation, material.control_mode)?;

        match plan {
            DeallocationPlan::Serialized => {
                let serial_id = allocation.serial_id.ok_or_else(|| {
                    InventoryError::StorageUnavailable(sqlx::Error::Decode(
                        "serialized allocation has no serial reference".into(),
                    ))
                })?;
                self.serials
                    .release(&mut tx, serial_id, SerialStatus::Available.as_str())
                    .await?;
            }
            DeallocationPlan::Quantity { available_delta } => {
                self.materials
                    .apply_stock_delta(&mut tx, material.id, available_delta, 0)
                    .await?;
            }
        }

        self.lines
            .adjust_allocated(&mut tx, allocation.checklist_line_id, -allocation.quantity)
            .await?;

        self.ledger
            .append(
                &mut tx,
                LedgerEntryInput {
                    material_id: material.id,
                    serial_id: allocation.serial_id,
                    serial_number: allocation.serial_number.clone(),
                    operation: MovementKind::Deallocation.as_str().to_string(),
                    quantity: allocation.quantity,
                    reason: Some("reservation cancelled".to_string()),
                    proof_refs: vec![],
                    event_id: Some(allocation.event_id),
                    event_name: allocation.event_name.clone(),
                },
            )
            .await?;

        self.allocations.delete(&mut tx, allocation.id).await?;

        tx.commit().await?;

        info!(%allocation_id, material_id = %material.id, "reservation cancelled");
        Ok(())
    }
}
