// src/core/export.rs — Download the current version to a file

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

use crate::core::snapshot::Snapshot;
use crate::infra::errors::PixshopError;

/// `<prefix>-<unix millis>.<ext>`
pub fn download_file_name(prefix: &str, snapshot: &Snapshot, at: DateTime<Utc>) -> String {
    format!(
        "{}-{}.{}",
        prefix,
        at.timestamp_millis(),
        snapshot.image().extension()
    )
}

/// Write `snapshot` into `dir` under a timestamped name and return the path.
pub async fn download(
    snapshot: &Snapshot,
    dir: &Path,
    prefix: &str,
) -> Result<PathBuf, PixshopError> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(download_file_name(prefix, snapshot, Utc::now()));
    tokio::fs::write(&path, snapshot.bytes()).await?;
    tracing::info!(path = %path.display(), seq = snapshot.seq(), "Image downloaded");
    Ok(path)
}
