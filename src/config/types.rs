//! Core configuration types for the photo crawler
//!
//! `CrawlConfig` is both the in-memory configuration and the on-disk
//! `config.json` layout. Unknown keys are rejected at load time, and every
//! numeric knob is range-checked by [`CrawlConfig::validate`](super::loader).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::utils::{
    DEFAULT_CONNECTIVITY_HOST, DEFAULT_CONNECTIVITY_INTERVAL_SECS, DEFAULT_EXTRACT_ATTEMPT_LIMIT,
    DEFAULT_EXTRACT_RELOAD_LIMIT, DEFAULT_MAIN_RETRY_LIMIT, DEFAULT_MAIN_RETRY_WAIT_SECS,
    DEFAULT_PAGE_LOAD_TIMEOUT_SECS, DEFAULT_PAGINATION_STALL_LIMIT, DEFAULT_STEP_DELAY_MS,
    DEFAULT_TASK_RETRY_LIMIT, DEFAULT_TASK_RETRY_WAIT_SECS, normalize_url,
};

/// How the supervising tier runs each crawl attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LaunchMode {
    /// Re-launch this binary as a `worker` child process per attempt.
    #[default]
    Process,
    /// Run the worker loop on a fresh browser inside the current process.
    InProcess,
}

/// Browser launch options (`puppeteerConfig` in older config files).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct BrowserConfig {
    pub(crate) headless: bool,
    /// Explicit Chrome/Chromium binary. Auto-detected when absent or empty.
    pub(crate) executable_path: Option<PathBuf>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            executable_path: None,
        }
    }
}

/// Main configuration struct for a crawl run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct CrawlConfig {
    /// First photo of the album to crawl.
    #[serde(alias = "destination")]
    pub(crate) target_url: String,
    /// Downloaded images and screenshots.
    pub(crate) data_dir: PathBuf,
    /// Work log export directory. Falls back to `dataDir` when absent or empty.
    #[serde(alias = "workLogPath")]
    pub(crate) work_log_dir: Option<PathBuf>,
    /// RecoveryLog directory.
    pub(crate) fail_log_dir: PathBuf,
    /// Cookie artifact produced by a separate login flow.
    pub(crate) cookie_path: PathBuf,

    #[serde(alias = "puppeteerConfig")]
    pub(crate) browser: BrowserConfig,

    #[serde(alias = "screenshotWeb")]
    pub(crate) screenshot: bool,

    /// Hard-navigate to the new photo URL after every pagination step.
    #[serde(alias = "fullLoad")]
    pub(crate) full_reload: bool,

    /// Tier A ceiling: retries after the first launch. Capped at 120.
    #[serde(alias = "retryLimit")]
    pub(crate) main_retry_limit: u32,
    #[serde(alias = "mainRetryWaitSec")]
    pub(crate) main_retry_wait_secs: u64,

    /// Tier B ceiling: session restarts inside one worker. Capped at 10.
    pub(crate) task_retry_limit: u32,
    #[serde(alias = "taskRetryWaitSec")]
    pub(crate) task_retry_wait_secs: u64,

    /// Empty-image polls before a page reload.
    pub(crate) extract_attempt_limit: u32,
    /// Page reloads before extraction gives up on the current photo.
    pub(crate) extract_reload_limit: u32,
    /// "Next" clicks without an identity change before the album is declared ended.
    pub(crate) pagination_stall_limit: u32,
    pub(crate) step_delay_ms: u64,
    pub(crate) page_load_timeout_secs: u64,

    /// Host resolved by the connectivity gate.
    pub(crate) connectivity_host: String,
    pub(crate) connectivity_interval_secs: u64,

    pub(crate) launch_mode: LaunchMode,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            target_url: String::new(),
            data_dir: PathBuf::from("data"),
            work_log_dir: None,
            fail_log_dir: PathBuf::from("fail"),
            cookie_path: PathBuf::from("cookie").join("cookie.json"),
            browser: BrowserConfig::default(),
            screenshot: false,
            full_reload: false,
            main_retry_limit: DEFAULT_MAIN_RETRY_LIMIT,
            main_retry_wait_secs: DEFAULT_MAIN_RETRY_WAIT_SECS,
            task_retry_limit: DEFAULT_TASK_RETRY_LIMIT,
            task_retry_wait_secs: DEFAULT_TASK_RETRY_WAIT_SECS,
            extract_attempt_limit: DEFAULT_EXTRACT_ATTEMPT_LIMIT,
            extract_reload_limit: DEFAULT_EXTRACT_RELOAD_LIMIT,
            pagination_stall_limit: DEFAULT_PAGINATION_STALL_LIMIT,
            step_delay_ms: DEFAULT_STEP_DELAY_MS,
            page_load_timeout_secs: DEFAULT_PAGE_LOAD_TIMEOUT_SECS,
            connectivity_host: DEFAULT_CONNECTIVITY_HOST.to_string(),
            connectivity_interval_secs: DEFAULT_CONNECTIVITY_INTERVAL_SECS,
            launch_mode: LaunchMode::Process,
        }
    }
}

// Overrides applied after loading (CLI flags)
impl CrawlConfig {
    #[must_use]
    pub fn with_target_url(mut self, url: impl Into<String>) -> Self {
        self.target_url = normalize_url(&url.into());
        self
    }

    #[must_use]
    pub fn with_launch_mode(mut self, mode: LaunchMode) -> Self {
        self.launch_mode = mode;
        self
    }
}
