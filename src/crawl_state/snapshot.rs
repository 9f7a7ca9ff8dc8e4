//! The serialisable crawl snapshot.
//!
//! One shape serves three purposes: the RecoveryLog file, the worker -> supervisor
//! handoff message, and the seed handed to a fresh worker.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::photo_map::PhotoMap;

/// `{ "currentUrl": ..., "photoData": { <fbid>: record } }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlSnapshot {
    /// Last URL known to be fully processed, or the resume target.
    pub current_url: String,
    #[serde(default)]
    pub photo_data: PhotoMap,
}

impl CrawlSnapshot {
    /// Fresh crawl starting at `target_url` with nothing fetched yet.
    pub fn fresh(target_url: impl Into<String>) -> Self {
        Self {
            current_url: target_url.into(),
            photo_data: PhotoMap::new(),
        }
    }

    /// Single-line JSON encoding used on the worker handoff channel.
    pub fn to_message(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to encode crawl snapshot")
    }

    pub fn from_message(message: &str) -> Result<Self> {
        serde_json::from_str(message.trim()).context("Failed to decode crawl snapshot")
    }
}
