use anyhow::Result;
use energy_client::domain::NewReading;
use monitor_service::{
    config::AppConfig,
    observability,
    pipeline::Pipeline,
    sinks::StoreSink,
    sources::ArchiveDirSource,
    store,
    transform::ReadingValidation,
};
use std::{env, path::PathBuf, sync::Arc};

/// Re-insert archived raw uplinks into the readings table.
///
/// Usage:
///   replay_archive [archive_dir]
///
/// Defaults to `archive.dir` from the service configuration.
#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    observability::init_tracing();

    let cfg = AppConfig::load()?;
    let dir = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| cfg.archive.dir.clone());

    let store = store::connect(&cfg.database).await?;

    let pipeline: Pipeline<_, NewReading, _> = Pipeline {
        source: ArchiveDirSource::new(&dir),
        transforms: vec![Arc::new(ReadingValidation)],
        sink: StoreSink::new(store, cfg.archive.replay_batch_size),
    };

    pipeline.run().await?;
    tracing::info!(dir = %dir.display(), "archive replay finished");

    Ok(())
}
