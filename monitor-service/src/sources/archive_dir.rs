use std::{
    path::{Path, PathBuf},
    time::SystemTime,
};

use async_stream::stream;
use energy_client::domain::NewReading;

use crate::pipeline::{Envelope, EnvelopeStream, PipelineError, Source};
use crate::uplink::Uplink;

/// Replays an uplink archive directory.
///
/// Every `*.json` file is read in file-name order, which for archive files is
/// device-then-receipt order. Unparseable files are yielded as `Err` items so
/// the sink can log and skip them without ending the run.
pub struct ArchiveDirSource {
    dir: PathBuf,
}

impl ArchiveDirSource {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }
}

async fn read_uplink(path: &Path) -> Result<Envelope<NewReading>, PipelineError> {
    let raw = tokio::fs::read(path)
        .await
        .map_err(|e| PipelineError::Source(format!("failed to read {}: {e}", path.display())))?;

    let received_at = tokio::fs::metadata(path)
        .await
        .and_then(|m| m.modified())
        .unwrap_or_else(|_| SystemTime::now());

    let uplink: Uplink = serde_json::from_slice(&raw).map_err(|e| {
        metrics::counter!("archive_replay_parse_errors_total").increment(1);
        PipelineError::Source(format!("failed to parse {}: {e}", path.display()))
    })?;

    Ok(Envelope::new(uplink.into_reading(received_at.into()), received_at))
}

#[async_trait::async_trait]
impl Source<NewReading> for ArchiveDirSource {
    async fn stream(&self) -> EnvelopeStream<NewReading> {
        let dir = self.dir.clone();
        let s = stream! {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) => {
                    yield Err(PipelineError::Source(format!(
                        "failed to open archive dir {}: {e}",
                        dir.display()
                    )));
                    return;
                }
            };

            let mut paths = Vec::new();
            loop {
                match entries.next_entry().await {
                    Ok(Some(entry)) => {
                        let path = entry.path();
                        if path.extension().is_some_and(|ext| ext == "json") {
                            paths.push(path);
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        yield Err(PipelineError::Source(format!("failed to list archive dir: {e}")));
                        break;
                    }
                }
            }
            paths.sort();
            tracing::info!(dir = %dir.display(), files = paths.len(), "replaying uplink archive");

            for path in paths {
                yield read_uplink(&path).await;
            }
        };

        Box::pin(s)
    }
}
