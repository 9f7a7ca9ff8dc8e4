//! Loading and validating `config.json`

use std::path::{Path, PathBuf};
use thiserror::Error;

use super::types::CrawlConfig;
use crate::utils::{MAX_MAIN_RETRY_LIMIT, MAX_TASK_RETRY_LIMIT, MAX_WAIT_SECS, is_valid_url, normalize_url};

/// Configuration rejected at load or build time
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("targetUrl is required")]
    MissingTargetUrl,

    #[error("targetUrl '{0}' is not an http(s) URL")]
    InvalidTargetUrl(String),

    #[error("{field} = {value} is out of range ({min}..={max})")]
    OutOfRange {
        field: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },

    #[error("{0} must not be empty")]
    Empty(&'static str),
}

fn check_range(field: &'static str, value: u64, min: u64, max: u64) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

impl CrawlConfig {
    /// Read, parse and validate a JSON config file.
    ///
    /// # Errors
    ///
    /// Unreadable files, unknown keys, malformed values and out-of-range
    /// settings are all rejected here rather than clamped.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut config = Self::parse_json_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON config file without validating it, so overrides
    /// can be applied before [`validate`](Self::validate).
    pub fn parse_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse and validate a JSON config document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let mut config: CrawlConfig =
            serde_json::from_str(raw).map_err(|source| ConfigError::Parse {
                path: PathBuf::new(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field against its allowed range.
    ///
    /// Also normalises the target URL, and treats an empty `executablePath`
    /// or `workLogPath` (older config files carry `""`) as unset.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        self.target_url = normalize_url(&self.target_url);
        if self.target_url.is_empty() {
            return Err(ConfigError::MissingTargetUrl);
        }
        if !is_valid_url(&self.target_url) {
            return Err(ConfigError::InvalidTargetUrl(self.target_url.clone()));
        }

        if self
            .browser
            .executable_path
            .as_ref()
            .is_some_and(|p| p.as_os_str().is_empty())
        {
            self.browser.executable_path = None;
        }
        if self.work_log_dir.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
            self.work_log_dir = None;
        }

        check_range(
            "mainRetryLimit",
            u64::from(self.main_retry_limit),
            0,
            u64::from(MAX_MAIN_RETRY_LIMIT),
        )?;
        check_range("mainRetryWaitSecs", self.main_retry_wait_secs, 0, MAX_WAIT_SECS)?;
        check_range(
            "taskRetryLimit",
            u64::from(self.task_retry_limit),
            0,
            u64::from(MAX_TASK_RETRY_LIMIT),
        )?;
        check_range("taskRetryWaitSecs", self.task_retry_wait_secs, 0, MAX_WAIT_SECS)?;
        check_range("extractAttemptLimit", u64::from(self.extract_attempt_limit), 1, 100)?;
        check_range("extractReloadLimit", u64::from(self.extract_reload_limit), 0, 20)?;
        check_range("paginationStallLimit", u64::from(self.pagination_stall_limit), 1, 1000)?;
        check_range("stepDelayMs", self.step_delay_ms, 0, 10_000)?;
        check_range("pageLoadTimeoutSecs", self.page_load_timeout_secs, 1, 600)?;
        check_range("connectivityIntervalSecs", self.connectivity_interval_secs, 1, MAX_WAIT_SECS)?;

        if self.connectivity_host.trim().is_empty() {
            return Err(ConfigError::Empty("connectivityHost"));
        }
        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::Empty("dataDir"));
        }
        if self.fail_log_dir.as_os_str().is_empty() {
            return Err(ConfigError::Empty("failLogDir"));
        }

        Ok(())
    }
}
