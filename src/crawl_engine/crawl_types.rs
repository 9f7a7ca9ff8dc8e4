//! Core types for the crawl loop: error types, termination reasons and the
//! session report.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;
use crate::recovery::RecoveryError;

/// Failure inside one fetch session.
///
/// Every variant is recoverable-session class: it escapes the fetch loop,
/// and the retry tiers decide what happens next.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("page operation failed: {0}")]
    Page(String),

    #[error("no image rendered at {url} after {reloads} reloads")]
    ExtractionStalled { url: String, reloads: u32 },

    #[error("download of {url} failed: {message}")]
    Download { url: String, message: String },

    #[error("failed to write {}: {message}", path.display())]
    Persist { path: PathBuf, message: String },
}

impl From<anyhow::Error> for FetchError {
    fn from(err: anyhow::Error) -> Self {
        Self::Page(format!("{err:#}"))
    }
}

/// Top-level error returned to the binary.
#[derive(Debug, Clone)]
pub enum CrawlError {
    /// Configuration error
    Config(String),
    /// Browser could not be launched or driven
    Browser(String),
    /// Outermost retry budget exhausted; a RecoveryLog was written
    RetryLimitReached {
        attempts: u32,
        recovery_log: PathBuf,
    },
    /// Operator interrupt
    Interrupted,
    /// Other errors
    Other(String),
}

impl fmt::Display for CrawlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::Browser(msg) => write!(f, "Browser error: {msg}"),
            Self::RetryLimitReached {
                attempts,
                recovery_log,
            } => write!(
                f,
                "Crawler failed after reaching the retry limit ({attempts} attempts); progress saved to {}",
                recovery_log.display()
            ),
            Self::Interrupted => write!(f, "Crawl interrupted by operator"),
            Self::Other(msg) => write!(f, "Crawl error: {msg}"),
        }
    }
}

impl std::error::Error for CrawlError {}

impl From<anyhow::Error> for CrawlError {
    fn from(err: anyhow::Error) -> Self {
        // Use {:#} to preserve full error chain with context
        Self::Other(format!("{err:#}"))
    }
}

impl From<ConfigError> for CrawlError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<FetchError> for CrawlError {
    fn from(err: FetchError) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<RecoveryError> for CrawlError {
    fn from(err: RecoveryError) -> Self {
        Self::Other(err.to_string())
    }
}

/// Convenience alias for Result with `CrawlError`
pub type CrawlResult<T> = Result<T, CrawlError>;

/// Why a fetch session stopped successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Pagination came back to a photo already in the map.
    CycledBack,
    /// The "next" control stopped changing the photo.
    EndOfAlbum,
}

/// Outcome of one successful fetch session.
#[derive(Debug, Clone)]
pub struct SessionReport {
    /// Photos recorded by this session (excludes resumed ones).
    pub new_photos: usize,
    /// Size of the photo map at the end.
    pub total_photos: usize,
    pub export_path: PathBuf,
    pub termination: Termination,
}
