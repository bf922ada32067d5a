use std::{pin::Pin, sync::Arc, time::SystemTime};

use futures::{Stream, StreamExt};
use time::OffsetDateTime;

/// A payload plus the moment it entered the service.
#[derive(Debug, Clone)]
pub struct Envelope<T> {
    pub payload: T,
    pub received_at: SystemTime,
}

impl<T> Envelope<T> {
    pub fn new(payload: T, received_at: SystemTime) -> Self {
        Self { payload, received_at }
    }

    pub fn received_at_utc(&self) -> OffsetDateTime {
        OffsetDateTime::from(self.received_at)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("source error: {0}")]
    Source(String),
    #[error("rejected: {0}")]
    Transform(String),
    #[error("sink error: {0}")]
    Sink(String),
}

pub type EnvelopeStream<T> = Pin<Box<dyn Stream<Item = Result<Envelope<T>, PipelineError>> + Send>>;

#[async_trait::async_trait]
pub trait Source<T>: Send + Sync {
    async fn stream(&self) -> EnvelopeStream<T>;
}

#[async_trait::async_trait]
pub trait Transform<I, O>: Send + Sync {
    async fn apply(&self, input: Envelope<I>) -> Result<Envelope<O>, PipelineError>;
}

/// Consumes a stream until it ends. Upstream `Err` items are the sink's to
/// log and skip; an `Err` return aborts the pipeline.
#[async_trait::async_trait]
pub trait Sink<T>: Send + Sync {
    async fn run<S>(&self, input: S) -> Result<(), PipelineError>
    where
        S: Stream<Item = Result<Envelope<T>, PipelineError>> + Send + Unpin + 'static;
}

/// Archive replay wiring: one source, transforms applied in order, one sink.
pub struct Pipeline<S, T, K> {
    pub source: S,
    pub transforms: Vec<Arc<dyn Transform<T, T>>>,
    pub sink: K,
}

impl<T, S, K> Pipeline<S, T, K>
where
    T: Send + 'static,
    S: Source<T> + 'static,
    K: Sink<T> + 'static,
{
    /// Drive the source to exhaustion. Each record passes through every
    /// transform sequentially; a record rejected by one transform reaches the
    /// sink as an `Err` and later transforms never see it. Returns the sink's
    /// result, so only sink failures abort a run.
    pub async fn run(self) -> Result<(), PipelineError> {
        let mut stream = self.source.stream().await;

        for transform in self.transforms {
            stream = Box::pin(stream.then(move |item| {
                let transform = transform.clone();
                async move {
                    match item {
                        Ok(env) => transform.apply(env).await,
                        Err(e) => Err(e),
                    }
                }
            }));
        }

        self.sink.run(stream).await
    }
}
