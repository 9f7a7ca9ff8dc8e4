use std::path::PathBuf;
use thiserror::Error;

/// RecoveryLog read/write/selection failures
#[derive(Debug, Error)]
pub enum RecoveryError {
    #[error("recovery log I/O failed for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("recovery log {} is not valid: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode recovery log: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("no free recovery log name for {0}")]
    NameExhausted(String),

    #[error("prompt failed: {0}")]
    Prompt(String),
}

impl RecoveryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
