use std::{
    io,
    path::{Path, PathBuf},
};

use time::{macros::format_description, OffsetDateTime, UtcOffset};
use tokio::{fs::OpenOptions, io::AsyncWriteExt};

/// Upper bound on `-N` suffixes tried for one base name.
const MAX_NAME_COLLISIONS: u32 = 1000;

/// Writes one raw JSON file per uplink for audit. Existing files are never
/// overwritten.
#[derive(Debug, Clone)]
pub struct UplinkArchive {
    dir: PathBuf,
}

impl UplinkArchive {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<device_name>_<device_id>_<YYYYMMDDTHHMMSS.mmmZ>.json`
    pub fn file_name(device_name: &str, device_id: &str, received_at: OffsetDateTime) -> io::Result<String> {
        Ok(format!("{}.json", file_stem(device_name, device_id, received_at)?))
    }

    pub async fn write(
        &self,
        device_name: &str,
        device_id: &str,
        received_at: OffsetDateTime,
        raw: &[u8],
    ) -> io::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let stem = file_stem(device_name, device_id, received_at)?;

        // Same device, same millisecond: `<stem>-1.json`, `<stem>-2.json`, ...
        for attempt in 0..=MAX_NAME_COLLISIONS {
            let name = if attempt == 0 {
                format!("{stem}.json")
            } else {
                format!("{stem}-{attempt}.json")
            };
            let path = self.dir.join(name);

            match OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(mut file) => {
                    file.write_all(raw).await?;
                    file.flush().await?;
                    return Ok(path);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            }
        }

        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("more than {MAX_NAME_COLLISIONS} archive files named {stem}"),
        ))
    }
}

fn file_stem(device_name: &str, device_id: &str, received_at: OffsetDateTime) -> io::Result<String> {
    let stamp = received_at
        .to_offset(UtcOffset::UTC)
        .format(format_description!(
            "[year][month][day]T[hour][minute][second].[subsecond digits:3]Z"
        ))
        .map_err(io::Error::other)?;
    Ok(format!("{}_{}_{stamp}", sanitize(device_name), sanitize(device_id)))
}

fn sanitize(part: &str) -> String {
    let cleaned: String = part
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '-' })
        .collect();
    if cleaned.is_empty() {
        "unknown".to_string()
    } else {
        cleaned
    }
}
