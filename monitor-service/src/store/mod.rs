//! Persistence seam between the HTTP layer and the database.

mod memory;
mod postgres;

use std::sync::Arc;

use energy_client::domain::{Block, NewReading, Reading, Unit};

use crate::config::{DatabaseConfig, StorageKind};

pub use memory::MemoryReadingStore;
pub use postgres::PgReadingStore;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] anyhow::Error),
}

#[async_trait::async_trait]
pub trait ReadingStore: Send + Sync {
    async fn insert_reading(&self, reading: &NewReading) -> Result<Reading, StoreError>;

    async fn insert_readings(&self, batch: &[NewReading]) -> Result<u64, StoreError>;

    /// Greatest `ts`, ties broken by greatest id.
    async fn latest_reading(&self, device_id: Option<&str>) -> Result<Option<Reading>, StoreError>;

    async fn latest_per_device(&self) -> Result<Vec<Reading>, StoreError>;

    /// Newest first, at most `limit` rows.
    async fn recent_readings(
        &self,
        device_id: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Reading>, StoreError>;

    async fn blocks(&self) -> Result<Vec<Block>, StoreError>;

    async fn units(&self, block_id: Option<i64>) -> Result<Vec<Unit>, StoreError>;
}

/// Open the store selected by `database.kind`.
pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<Arc<dyn ReadingStore>> {
    let store: Arc<dyn ReadingStore> = match cfg.kind {
        StorageKind::Postgres => Arc::new(PgReadingStore::connect(cfg).await?),
        StorageKind::Memory => {
            tracing::warn!("using in-memory reading store; data is lost on exit");
            Arc::new(MemoryReadingStore::default())
        }
    };
    Ok(store)
}
