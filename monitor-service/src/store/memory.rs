use std::collections::BTreeMap;

use energy_client::domain::{Block, NewReading, Reading, Unit};
use tokio::sync::RwLock;

use super::{ReadingStore, StoreError};

#[derive(Default)]
struct Tables {
    readings: Vec<Reading>,
    blocks: Vec<Block>,
    units: Vec<Unit>,
}

/// Process-local store for development runs and tests.
#[derive(Default)]
pub struct MemoryReadingStore {
    tables: RwLock<Tables>,
}

impl MemoryReadingStore {
    /// Seed blocks and units; both are kept ordered by id like the SQL listings.
    pub fn with_locations(mut blocks: Vec<Block>, mut units: Vec<Unit>) -> Self {
        blocks.sort_by_key(|b| b.id);
        units.sort_by_key(|u| u.id);
        Self {
            tables: RwLock::new(Tables {
                readings: Vec::new(),
                blocks,
                units,
            }),
        }
    }

    pub async fn len(&self) -> usize {
        self.tables.read().await.readings.len()
    }
}

fn newest_first(a: &Reading, b: &Reading) -> std::cmp::Ordering {
    (b.ts, b.id).cmp(&(a.ts, a.id))
}

fn matches_device(r: &Reading, device_id: Option<&str>) -> bool {
    device_id.map_or(true, |id| r.device_id == id)
}

#[async_trait::async_trait]
impl ReadingStore for MemoryReadingStore {
    async fn insert_reading(&self, reading: &NewReading) -> Result<Reading, StoreError> {
        let mut tables = self.tables.write().await;
        let id = tables.readings.len() as i64 + 1;
        let row = reading.clone().with_id(id);
        tables.readings.push(row.clone());
        Ok(row)
    }

    async fn insert_readings(&self, batch: &[NewReading]) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;
        for reading in batch {
            let id = tables.readings.len() as i64 + 1;
            tables.readings.push(reading.clone().with_id(id));
        }
        Ok(batch.len() as u64)
    }

    async fn latest_reading(&self, device_id: Option<&str>) -> Result<Option<Reading>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .readings
            .iter()
            .filter(|r| matches_device(r, device_id))
            .min_by(|a, b| newest_first(a, b))
            .cloned())
    }

    async fn latest_per_device(&self) -> Result<Vec<Reading>, StoreError> {
        let tables = self.tables.read().await;
        let mut latest: BTreeMap<&str, &Reading> = BTreeMap::new();
        for r in &tables.readings {
            latest
                .entry(r.device_id.as_str())
                .and_modify(|cur| {
                    if newest_first(r, *cur).is_lt() {
                        *cur = r;
                    }
                })
                .or_insert(r);
        }
        Ok(latest.into_values().cloned().collect())
    }

    async fn recent_readings(
        &self,
        device_id: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Reading>, StoreError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Reading> = tables
            .readings
            .iter()
            .filter(|r| matches_device(r, device_id))
            .cloned()
            .collect();
        rows.sort_by(newest_first);
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn blocks(&self) -> Result<Vec<Block>, StoreError> {
        Ok(self.tables.read().await.blocks.clone())
    }

    async fn units(&self, block_id: Option<i64>) -> Result<Vec<Unit>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .units
            .iter()
            .filter(|u| block_id.map_or(true, |id| u.block_id == id))
            .cloned()
            .collect())
    }
}
