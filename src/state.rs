//! Application state for Foilpress.
//!
//! Contains the shared state that is passed to all handlers.

use crate::db::DbPool;
use crate::services::LedgerService;
use crate::{config, Result};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: DbPool,
    /// Balance aggregation and dashboard service.
    pub ledger: LedgerService,
}

impl AppState {
    /// Create a new application state, initializing the database.
    pub async fn new() -> Result<Self> {
        let config = config::config();

        let db = crate::db::init_pool(&config.database.path).await?;
        crate::db::initialize_schema(&db).await?;

        Ok(Self::with_pool(db))
    }

    /// Build state around an existing pool. Used by integration tests
    /// with an in-memory database.
    pub fn with_pool(db: DbPool) -> Self {
        let ledger = LedgerService::new(db.clone());
        Self { db, ledger }
    }
}
