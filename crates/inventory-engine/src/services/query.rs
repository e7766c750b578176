//! Query service: read-side views over catalog and allocation state.
//!
//! Fetches rows through the repositories and hands the arithmetic to the pure
//! projections in `domain::services::projection`. Nothing here mutates state.

use sqlx::PgPool;
use uuid::Uuid;

use domain::models::allocation::Allocation;
use domain::models::ledger::MovementLedgerEntry;
use domain::models::material::ControlMode;
use domain::models::serial::Serial;
use domain::services::projection::{self, ChecklistProgress, StockSummary};
use domain::InventoryError;

use persistence::repositories::{
    AllocationRepository, ChecklistLineRepository, LedgerQuery, LedgerRepository,
    MaterialRepository, SerialRepository,
};

/// Default page size for movement history queries.
const DEFAULT_LEDGER_PAGE_SIZE: i32 = 50;

/// One page of movement history, newest first.
#[derive(Debug)]
pub struct MovementPage {
    pub entries: Vec<MovementLedgerEntry>,
    /// Cursor for the next page, present when more entries exist.
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

/// Read-only views for the presentation layer.
#[derive(Clone)]
pub struct QueryService {
    materials: MaterialRepository,
    serials: SerialRepository,
    lines: ChecklistLineRepository,
    allocations: AllocationRepository,
    ledger: LedgerRepository,
}

impl QueryService {
    /// Creates a new QueryService on the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            materials: MaterialRepository::new(pool.clone()),
            serials: SerialRepository::new(pool.clone()),
            lines: ChecklistLineRepository::new(pool.clone()),
            allocations: AllocationRepository::new(pool.clone()),
            ledger: LedgerRepository::new(pool),
        }
    }

    /// Serials of a material for the allocation picker: available units
    /// first, then lexicographically by number.
    pub async fn serials_for_allocation(
        &self,
        material_id: Uuid,
    ) -> Result<Vec<Serial>, InventoryError> {
        let serials = self
            .serials
            .list_for_material(material_id)
            .await?
            .into_iter()
            .map(|e| e.into_domain())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(projection::sort_serials_for_allocation(serials))
    }

    /// Allocations of an event still awaiting return processing, oldest
    /// first.
    pub async fn pending_returns(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<Allocation>, InventoryError> {
        let allocations = self
            .allocations
            .list_for_event(event_id)
            .await?
            .into_iter()
            .map(|e| e.into_domain())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(projection::pending_returns(&allocations))
    }

    /// Aggregate stock view of one material.
    ///
    /// Serialized materials derive every count from their serials; quantity
    /// materials combine the stored counters with open reservations.
    pub async fn material_summary(
        &self,
        material_id: Uuid,
    ) -> Result<StockSummary, InventoryError> {
        let material = self
            .materials
            .find_by_id(material_id)
            .await?
            .ok_or(InventoryError::MaterialNotFound(material_id))?
            .into_domain()?;

        let summary = match material.control_mode {
            ControlMode::Serialized => {
                let serials = self
                    .serials
                    .list_for_material(material_id)
                    .await?
                    .into_iter()
                    .map(|e| e.into_domain())
                    .collect::<Result<Vec<_>, _>>()?;
                projection::summarize_stock(&material, &serials, &[])
            }
            ControlMode::Quantity => {
                let open = self
                    .allocations
                    .list_open_for_material(material_id)
                    .await?
                    .into_iter()
                    .map(|e| e.into_domain())
                    .collect::<Result<Vec<_>, _>>()?;
                projection::summarize_stock(&material, &[], &open)
            }
        };

        Ok(summary)
    }

    /// Fulfillment progress of an event's checklist.
    pub async fn checklist_progress(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<ChecklistProgress>, InventoryError> {
        let lines: Vec<_> = self
            .lines
            .list_for_event(event_id)
            .await?
            .into_iter()
            .map(|e| e.into_domain())
            .collect();

        Ok(projection::checklist_progress(&lines))
    }

    /// Movement history of a material, newest first, optionally narrowed to
    /// one serial, with cursor pagination.
    pub async fn movement_history(
        &self,
        material_id: Uuid,
        serial_number: Option<String>,
        cursor: Option<String>,
        limit: Option<i32>,
    ) -> Result<MovementPage, InventoryError> {
        let (cursor_recorded_at, cursor_id) = match cursor {
            Some(raw) => {
                let (ts, id) = shared::pagination::decode_cursor(&raw)
                    .map_err(|e| InventoryError::Validation(e.to_string()))?;
                (Some(ts), Some(id))
            }
            None => (None, None),
        };

        let limit = limit.unwrap_or(DEFAULT_LEDGER_PAGE_SIZE).clamp(1, 500);

        let (entities, has_more) = self
            .ledger
            .query_by_material(LedgerQuery {
                material_id,
                serial_number,
                cursor_recorded_at,
                cursor_id,
                limit,
            })
            .await?;

        let entries = entities
            .into_iter()
            .map(|e| e.into_domain())
            .collect::<Result<Vec<_>, _>>()?;

        let next_cursor = if has_more {
            entries
                .last()
                .map(|entry| shared::pagination::encode_cursor(entry.recorded_at, entry.id))
        } else {
            None
        };

        Ok(MovementPage {
            entries,
            next_cursor,
            has_more,
        })
    }
}
