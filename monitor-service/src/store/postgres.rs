use energy_client::{
    db::{location_queries, reading_queries, schema},
    domain::{Block, NewReading, Reading, Unit},
};
use sqlx::postgres::{PgPool, PgPoolOptions};

use super::{ReadingStore, StoreError};
use crate::config::DatabaseConfig;

pub struct PgReadingStore {
    pool: PgPool,
}

impl PgReadingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect eagerly, falling back to a lazily-connecting pool when the
    /// database is unreachable so the service still starts.
    pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<Self> {
        let options = PgPoolOptions::new().max_connections(cfg.max_connections);
        let connect_opts = cfg.connect_options();

        let pool = match options.clone().connect_with(connect_opts.clone()).await {
            Ok(pool) => {
                tracing::info!(host = %cfg.host, database = %cfg.name, "connected to postgres");
                if cfg.apply_schema {
                    if let Err(e) = schema::apply_schema(&pool).await {
                        tracing::error!(error = %e, "failed to apply schema");
                    }
                }
                pool
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    host = %cfg.host,
                    database = %cfg.name,
                    "postgres connection failed; queries will fail until it is reachable"
                );
                options.connect_lazy_with(connect_opts)
            }
        };

        Ok(Self::new(pool))
    }
}

#[async_trait::async_trait]
impl ReadingStore for PgReadingStore {
    async fn insert_reading(&self, reading: &NewReading) -> Result<Reading, StoreError> {
        Ok(reading_queries::insert_reading(&self.pool, reading).await?)
    }

    async fn insert_readings(&self, batch: &[NewReading]) -> Result<u64, StoreError> {
        Ok(reading_queries::insert_readings(&self.pool, batch).await?)
    }

    async fn latest_reading(&self, device_id: Option<&str>) -> Result<Option<Reading>, StoreError> {
        Ok(reading_queries::latest_reading(&self.pool, device_id).await?)
    }

    async fn latest_per_device(&self) -> Result<Vec<Reading>, StoreError> {
        Ok(reading_queries::latest_per_device(&self.pool).await?)
    }

    async fn recent_readings(
        &self,
        device_id: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Reading>, StoreError> {
        Ok(reading_queries::recent_readings(&self.pool, device_id, limit).await?)
    }

    async fn blocks(&self) -> Result<Vec<Block>, StoreError> {
        Ok(location_queries::list_blocks(&self.pool).await?)
    }

    async fn units(&self, block_id: Option<i64>) -> Result<Vec<Unit>, StoreError> {
        Ok(location_queries::list_units(&self.pool, block_id).await?)
    }
}
