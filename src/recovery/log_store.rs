//! On-disk RecoveryLog artifacts.
//!
//! A RecoveryLog is a [`CrawlSnapshot`] written to
//! `<failLogDir>/<timestamp>_fail.json` when a run ends without finishing.
//! Writes never replace an existing artifact; a consumed artifact is renamed
//! so it is offered only once.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use super::errors::RecoveryError;
use crate::crawl_state::CrawlSnapshot;
use crate::utils::file_timestamp;

/// Suffix appended to a RecoveryLog once it has been resumed from.
pub const CONSUMED_SUFFIX: &str = "consumed";

/// Collision suffixes tried before giving up on a timestamp.
const MAX_NAME_ATTEMPTS: u32 = 1000;

#[derive(Debug, Clone)]
pub struct RecoveryLogStore {
    dir: PathBuf,
}

impl RecoveryLogStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist `snapshot` as a new artifact and return its path.
    pub async fn write(&self, snapshot: &CrawlSnapshot) -> Result<PathBuf, RecoveryError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| RecoveryError::io(&self.dir, e))?;

        let body = serde_json::to_vec(snapshot)?;
        let stem = format!("{}_fail", file_timestamp());

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = if attempt == 0 {
                format!("{stem}.json")
            } else {
                format!("{stem}_{attempt}.json")
            };
            let path = self.dir.join(name);

            let mut file = match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(RecoveryError::io(&path, e)),
            };

            file.write_all(&body)
                .await
                .map_err(|e| RecoveryError::io(&path, e))?;
            file.sync_all()
                .await
                .map_err(|e| RecoveryError::io(&path, e))?;

            info!(
                path = %path.display(),
                photos = snapshot.photo_data.len(),
                current_url = %snapshot.current_url,
                "Recovery log written"
            );
            return Ok(path);
        }

        Err(RecoveryError::NameExhausted(stem))
    }

    /// Candidate artifacts, oldest first.
    ///
    /// A candidate is a `.json` file whose stem contains `fail`. A missing
    /// directory simply has no candidates.
    pub async fn list(&self) -> Result<Vec<PathBuf>, RecoveryError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(RecoveryError::io(&self.dir, e)),
        };

        let mut logs = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| RecoveryError::io(&self.dir, e))?
        {
            let path = entry.path();
            if is_candidate(&path) && entry.file_type().await.is_ok_and(|t| t.is_file()) {
                logs.push(path);
            }
        }
        logs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(logs)
    }

    /// Parse an artifact without consuming it.
    pub async fn read(&self, path: &Path) -> Result<CrawlSnapshot, RecoveryError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| RecoveryError::io(path, e))?;
        serde_json::from_str(&raw).map_err(|source| RecoveryError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load an artifact and retire it so it is not offered again.
    pub async fn consume(&self, path: &Path) -> Result<CrawlSnapshot, RecoveryError> {
        let snapshot = self.read(path).await?;

        let mut retired: OsString = path.as_os_str().to_owned();
        retired.push(".");
        retired.push(CONSUMED_SUFFIX);
        if let Err(e) = tokio::fs::rename(path, &retired).await {
            // The run can still proceed; the artifact will just be offered again
            warn!(path = %path.display(), "Failed to retire recovery log: {e}");
        }

        info!(
            path = %path.display(),
            photos = snapshot.photo_data.len(),
            current_url = %snapshot.current_url,
            "Resuming from recovery log"
        );
        Ok(snapshot)
    }
}

fn is_candidate(path: &Path) -> bool {
    let has_json_ext = path.extension().is_some_and(|ext| ext == "json");
    let stem_mentions_fail = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .is_some_and(|stem| stem.contains("fail"));
    has_json_ext && stem_mentions_fail
}
