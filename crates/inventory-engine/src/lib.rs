//! Inventory allocation and return-reconciliation engine.
//!
//! In-process component for an event-production company: tracks serialized
//! units and bulk materials, reserves them against event checklists, and
//! reconciles their return afterward. Consumed by the event module and a
//! presentation layer; owns no HTTP surface of its own.
//!
//! Every mutating operation runs inside one database transaction with row
//! locks on the touched material/serial, and appends exactly one movement
//! ledger entry.

pub mod config;
pub mod logging;
pub mod services;

use sqlx::PgPool;

pub use config::Config;
pub use domain::InventoryError;
pub use services::allocation::AllocationService;
pub use services::catalog::CatalogService;
pub use services::query::QueryService;
pub use services::returns::{BatchReturnItem, ReturnService};

/// Facade bundling the engine's services over one connection pool.
#[derive(Clone)]
pub struct InventoryEngine {
    pub catalog: CatalogService,
    pub allocations: AllocationService,
    pub returns: ReturnService,
    pub queries: QueryService,
}

impl InventoryEngine {
    /// Build the engine on an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            catalog: CatalogService::new(pool.clone()),
            allocations: AllocationService::new(pool.clone()),
            returns: ReturnService::new(pool.clone()),
            queries: QueryService::new(pool),
        }
    }

    /// Connect to the configured database and build the engine.
    pub async fn connect(config: &Config) -> Result<Self, sqlx::Error> {
        let pool = persistence::db::create_pool(&config.database).await?;
        Ok(Self::new(pool))
    }
}
