//! Getter methods for `CrawlConfig`

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::types::{CrawlConfig, LaunchMode};

impl CrawlConfig {
    #[must_use]
    pub fn target_url(&self) -> &str {
        &self.target_url
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    #[must_use]
    pub fn work_log_dir(&self) -> &Path {
        self.work_log_dir.as_deref().unwrap_or(&self.data_dir)
    }

    #[must_use]
    pub fn fail_log_dir(&self) -> &Path {
        &self.fail_log_dir
    }

    #[must_use]
    pub fn cookie_path(&self) -> &Path {
        &self.cookie_path
    }

    #[must_use]
    pub fn headless(&self) -> bool {
        self.browser.headless
    }

    #[must_use]
    pub fn executable_path(&self) -> Option<&PathBuf> {
        self.browser.executable_path.as_ref()
    }

    #[must_use]
    pub fn screenshot(&self) -> bool {
        self.screenshot
    }

    #[must_use]
    pub fn full_reload(&self) -> bool {
        self.full_reload
    }

    #[must_use]
    pub fn main_retry_limit(&self) -> u32 {
        self.main_retry_limit
    }

    #[must_use]
    pub fn main_retry_wait(&self) -> Duration {
        Duration::from_secs(self.main_retry_wait_secs)
    }

    #[must_use]
    pub fn task_retry_limit(&self) -> u32 {
        self.task_retry_limit
    }

    #[must_use]
    pub fn task_retry_wait(&self) -> Duration {
        Duration::from_secs(self.task_retry_wait_secs)
    }

    #[must_use]
    pub fn extract_attempt_limit(&self) -> u32 {
        self.extract_attempt_limit
    }

    #[must_use]
    pub fn extract_reload_limit(&self) -> u32 {
        self.extract_reload_limit
    }

    #[must_use]
    pub fn pagination_stall_limit(&self) -> u32 {
        self.pagination_stall_limit
    }

    #[must_use]
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    #[must_use]
    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs)
    }

    #[must_use]
    pub fn connectivity_host(&self) -> &str {
        &self.connectivity_host
    }

    #[must_use]
    pub fn connectivity_interval(&self) -> Duration {
        Duration::from_secs(self.connectivity_interval_secs)
    }

    #[must_use]
    pub fn launch_mode(&self) -> LaunchMode {
        self.launch_mode
    }
}
