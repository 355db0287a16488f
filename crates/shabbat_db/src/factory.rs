//! Store selection
//!
//! Picks the SQL store when a `[database]` section is configured and falls
//! back to the in-process store otherwise.

use crate::client::DbClient;
use crate::error::DbError;
use crate::memory::MemoryShabbatStore;
use crate::repositories::SqlShabbatStore;
use crate::repository::ShabbatStore;
use shabbat_config::{AppConfig, DatabaseConfig};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default)]
pub struct StoreFactory;

impl StoreFactory {
    pub fn new() -> Self {
        Self
    }

    /// Open the store described by `config` and make sure its schema exists.
    pub async fn from_app_config(
        &self,
        config: &AppConfig,
    ) -> Result<Arc<dyn ShabbatStore>, DbError> {
        match config.database.as_ref() {
            Some(db_config) => self.from_db_config(db_config).await,
            None => {
                warn!("No database configured; preferences will not survive a restart");
                Ok(Arc::new(MemoryShabbatStore::new()))
            }
        }
    }

    pub async fn from_db_config(
        &self,
        db_config: &DatabaseConfig,
    ) -> Result<Arc<dyn ShabbatStore>, DbError> {
        debug!("Opening SQL store");
        let client = DbClient::from_config(db_config).await?;
        let store = SqlShabbatStore::new(client);
        store.init_schema().await?;
        Ok(Arc::new(store))
    }
}

/// Shorthand for `StoreFactory::new().from_app_config(config)`.
pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn ShabbatStore>, DbError> {
    StoreFactory::new().from_app_config(config).await
}
