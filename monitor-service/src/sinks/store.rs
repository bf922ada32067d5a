use std::sync::Arc;

use energy_client::{db::reading_queries::MAX_ROWS_PER_INSERT, domain::NewReading};
use futures::StreamExt;

use crate::pipeline::{Envelope, PipelineError, Sink};
use crate::store::ReadingStore;

/// Batches readings into multi-row inserts. No retries: a failed batch
/// aborts the run. Batch size is clamped to `1..=MAX_ROWS_PER_INSERT`.
pub struct StoreSink {
    store: Arc<dyn ReadingStore>,
    batch_size: usize,
}

impl StoreSink {
    pub fn new(store: Arc<dyn ReadingStore>, batch_size: usize) -> Self {
        Self {
            store,
            batch_size: batch_size.clamp(1, MAX_ROWS_PER_INSERT),
        }
    }

    async fn flush_batch(&self, batch: &[NewReading]) -> Result<u64, PipelineError> {
        if batch.is_empty() {
            return Ok(0);
        }

        match self.store.insert_readings(batch).await {
            Ok(inserted) => {
                metrics::counter!("readings_inserted_total").increment(inserted);
                Ok(inserted)
            }
            Err(e) => {
                tracing::error!(error = %e, batch = batch.len(), "reading batch insert failed");
                metrics::counter!("reading_insert_errors_total").increment(1);
                Err(PipelineError::Sink(e.to_string()))
            }
        }
    }
}

#[async_trait::async_trait]
impl Sink<NewReading> for StoreSink {
    async fn run<S>(&self, mut input: S) -> Result<(), PipelineError>
    where
        S: futures::Stream<Item = Result<Envelope<NewReading>, PipelineError>> + Send + Unpin + 'static,
    {
        let mut buffer: Vec<NewReading> = Vec::with_capacity(self.batch_size);
        let mut inserted = 0u64;
        let mut skipped = 0u64;

        while let Some(item) = input.next().await {
            let env = match item {
                Ok(env) => env,
                Err(e) => {
                    tracing::warn!(error = %e, "skipping record");
                    skipped += 1;
                    continue;
                }
            };

            buffer.push(env.payload);
            if buffer.len() >= self.batch_size {
                inserted += self.flush_batch(&buffer).await?;
                buffer.clear();
            }
        }

        inserted += self.flush_batch(&buffer).await?;

        tracing::info!(inserted, skipped, "store sink drained");
        Ok(())
    }
}
