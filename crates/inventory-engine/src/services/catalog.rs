//! Catalog service: materials and serials with invariant enforcement.
//!
//! Every successful mutation appends exactly one movement ledger entry in the
//! same transaction.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use domain::models::ledger::MovementKind;
use domain::models::material::{AdjustQuantityRequest, ControlMode, CreateMaterialRequest, Material};
use domain::models::serial::{CreateSerialRequest, Serial, SerialStatus};
use domain::InventoryError;

use persistence::repositories::{
    LedgerEntryInput, LedgerRepository, MaterialInput, MaterialRepository, SerialInput,
    SerialRepository,
};

use super::with_tx_retry;

/// Read/write primitives for the equipment catalog.
#[derive(Clone)]
pub struct CatalogService {
    pool: PgPool,
    materials: MaterialRepository,
    serials: SerialRepository,
    ledger: LedgerRepository,
}

impl CatalogService {
    /// Creates a new CatalogService on the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            materials: MaterialRepository::new(pool.clone()),
            serials: SerialRepository::new(pool.clone()),
            ledger: LedgerRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a catalog entry.
    ///
    /// Quantity materials may start with initial stock, recorded as a
    /// STOCK_ENTRY; serialized materials always start empty.
    pub async fn create_material(
        &self,
        request: CreateMaterialRequest,
    ) -> Result<Material, InventoryError> {
        request.validate()?;

        let initial_quantity = match request.control_mode {
            ControlMode::Quantity => request.initial_quantity,
            ControlMode::Serialized => 0,
        };

        let mut tx = self.pool.begin().await?;

        let entity = self
            .materials
            .insert(
                &mut tx,
                MaterialInput {
                    name: request.name,
                    category: request.category,
                    control_mode: request.control_mode.as_str().to_string(),
                    initial_quantity,
                    description: request.description,
                },
            )
            .await?;

        if initial_quantity > 0 {
            self.ledger
                .append(
                    &mut tx,
                    LedgerEntryInput {
                        material_id: entity.id,
                        serial_id: None,
                        serial_number: None,
                        operation: MovementKind::StockEntry.as_str().to_string(),
                        quantity: initial_quantity,
                        reason: Some("initial stock".to_string()),
                        proof_refs: vec![],
                        event_id: None,
                        event_name: None,
                    },
                )
                .await?;
        }

        tx.commit().await?;

        info!(material_id = %entity.id, name = %entity.name, "material created");
        entity.into_domain().map_err(Into::into)
    }

    /// Register a new serialized unit for a material.
    pub async fn create_serial(
        &self,
        material_id: Uuid,
        request: CreateSerialRequest,
    ) -> Result<Serial, InventoryError> {
        request.validate()?;
        let request = &request;
        with_tx_retry("create_serial", move || {
            self.try_create_serial(material_id, request)
        })
        .await
    }

    async fn try_create_serial(
        &self,
        material_id: Uuid,
        request: &CreateSerialRequest,
    ) -> Result<Serial, InventoryError> {
        let mut tx = self.pool.begin().await?;

        let material = self
            .materials
            .lock_by_id(&mut tx, material_id)
            .await?
            .ok_or(InventoryError::MaterialNotFound(material_id))?
            .into_domain()?;

        match material.control_mode {
            ControlMode::Serialized => {}
            ControlMode::Quantity => {
                return Err(InventoryError::WrongControlMode {
                    material_id,
                    expected: ControlMode::Serialized,
                    actual: ControlMode::Quantity,
                });
            }
        }

        let inserted = self
            .serials
            .insert(
                &mut tx,
                SerialInput {
                    material_id,
                    serial_number: request.serial_number.clone(),
                    location: request.location.clone(),
                    tags: request.tags.clone(),
                },
            )
            .await?;

        let Some(entity) = inserted else {
            return Err(InventoryError::DuplicateSerialNumber {
                material_id,
                number: request.serial_number.clone(),
            });
        };

        self.ledger
            .append(
                &mut tx,
                LedgerEntryInput {
                    material_id,
                    serial_id: Some(entity.id),
                    serial_number: Some(entity.serial_number.clone()),
                    operation: MovementKind::StockEntry.as_str().to_string(),
                    quantity: 1,
                    reason: Some("serial registered".to_string()),
                    proof_refs: vec![],
                    event_id: None,
                    event_name: None,
                },
            )
            .await?;

        tx.commit().await?;

        info!(%material_id, serial_number = %entity.serial_number, "serial registered");
        entity.into_domain().map_err(Into::into)
    }

    /// Remove a serialized unit from the catalog.
    ///
    /// Units allocated to an event cannot be removed; resolve the allocation
    /// first.
    pub async fn delete_serial(
        &self,
        material_id: Uuid,
        serial_number: &str,
    ) -> Result<(), InventoryError> {
        with_tx_retry("delete_serial", || {
            self.try_delete_serial(material_id, serial_number)
        })
        .await
    }

    async fn try_delete_serial(
        &self,
        material_id: Uuid,
        serial_number: &str,
    ) -> Result<(), InventoryError> {
        let mut tx = self.pool.begin().await?;

        let serial = self
            .serials
            .lock_by_number(&mut tx, material_id, serial_number)
            .await?
            .ok_or_else(|| InventoryError::SerialNotFound {
                material_id,
                number: serial_number.to_string(),
            })?
            .into_domain()?;

        if serial.status == SerialStatus::InUse {
            return Err(InventoryError::SerialInUse {
                material_id,
                number: serial_number.to_string(),
            });
        }

        self.serials
            .delete(&mut tx, material_id, serial_number)
            .await?;

        self.ledger
            .append(
                &mut tx,
                LedgerEntryInput {
                    material_id,
                    serial_id: Some(serial.id),
                    serial_number: Some(serial.serial_number.clone()),
                    operation: MovementKind::StockExit.as_str().to_string(),
                    quantity: 1,
                    reason: Some("serial removed from catalog".to_string()),
                    proof_refs: vec![],
                    event_id: None,
                    event_name: None,
                },
            )
            .await?;

        tx.commit().await?;

        info!(%material_id, serial_number, "serial removed");
        Ok(())
    }

    /// Manually adjust a quantity material's stock.
    ///
    /// Positive deltas record a STOCK_ENTRY, negative ones a STOCK_EXIT.
    pub async fn adjust_quantity(
        &self,
        material_id: Uuid,
        request: AdjustQuantityRequest,
    ) -> Result<Material, InventoryError> {
        request.validate()?;
        let request = &request;
        with_tx_retry("adjust_quantity", move || {
            self.try_adjust_quantity(material_id, request)
        })
        .await
    }

    async fn try_adjust_quantity(
        &self,
        material_id: Uuid,
        request: &AdjustQuantityRequest,
    ) -> Result<Material, InventoryError> {
        if request.delta == 0 {
            return Err(InventoryError::Validation(
                "adjustment delta must not be zero".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let material = self
            .materials
            .lock_by_id(&mut tx, material_id)
            .await?
            .ok_or(InventoryError::MaterialNotFound(material_id))?
            .into_domain()?;

        match material.control_mode {
            ControlMode::Quantity => {}
            ControlMode::Serialized => {
                return Err(InventoryError::WrongControlMode {
                    material_id,
                    expected: ControlMode::Quantity,
                    actual: ControlMode::Serialized,
                });
            }
        }

        if material.available_quantity + request.delta < 0 {
            return Err(InventoryError::NegativeStockViolation {
                material_id,
                delta: request.delta,
            });
        }

        // Manual adjustments move total and available together.
        let updated = self
            .materials
            .apply_stock_delta(&mut tx, material_id, request.delta, request.delta)
            .await?;

        let operation = if request.delta >= 0 {
            MovementKind::StockEntry
        } else {
            MovementKind::StockExit
        };

        self.ledger
            .append(
                &mut tx,
                LedgerEntryInput {
                    material_id,
                    serial_id: None,
                    serial_number: None,
                    operation: operation.as_str().to_string(),
                    quantity: request.delta.abs(),
                    reason: Some(request.reason.clone()),
                    proof_refs: vec![],
                    event_id: None,
                    event_name: None,
                },
            )
            .await?;

        tx.commit().await?;

        info!(%material_id, delta = request.delta, "stock adjusted");
        updated.into_domain().map_err(Into::into)
    }
}
