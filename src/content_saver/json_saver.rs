//! JSON artifact persistence for the export log.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::crawl_state::PhotoMap;
use crate::utils::file_timestamp;

/// Create `dir` (and parents) if it does not exist.
pub async fn ensure_dir(dir: &Path) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create directory {}", dir.display()))
}

/// Serialise `data` to `path`, creating the parent directory.
///
/// Writes `<path>.tmp` first and renames it over `path`, so a crash mid-write
/// never leaves a truncated artifact behind.
pub async fn save_json_file<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent).await?;
    }

    let json = serde_json::to_vec(data).context("JSON serialization failed")?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, &json)
        .await
        .with_context(|| format!("Failed to write {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("Failed to move {} into place", path.display()))?;
    Ok(())
}

/// Write the full photo map to `<data_dir>/<timestamp>_work_log.json`.
pub async fn export_work_log(data_dir: &Path, photos: &PhotoMap) -> Result<PathBuf> {
    let path = data_dir.join(format!("{}_work_log.json", file_timestamp()));
    save_json_file(&path, photos).await?;
    log::info!("Exported {} photos to {}", photos.len(), path.display());
    Ok(path)
}
