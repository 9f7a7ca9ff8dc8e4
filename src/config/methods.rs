//! Builder methods available for all states

use std::path::PathBuf;

use super::builder::CrawlConfigBuilder;
use super::types::LaunchMode;

impl<State> CrawlConfigBuilder<State> {
    #[must_use]
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.data_dir = dir.into();
        self
    }

    #[must_use]
    pub fn work_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.work_log_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn fail_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.fail_log_dir = dir.into();
        self
    }

    #[must_use]
    pub fn cookie_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.cookie_path = path.into();
        self
    }

    /// Set browser headless mode (visible vs invisible browser window)
    ///
    /// Headed mode needs a display server and is mostly useful when checking
    /// that the cookie artifact still yields a logged-in session.
    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.config.browser.headless = headless;
        self
    }

    #[must_use]
    pub fn executable_path(mut self, path: Option<PathBuf>) -> Self {
        self.config.browser.executable_path = path;
        self
    }

    #[must_use]
    pub fn screenshot(mut self, enabled: bool) -> Self {
        self.config.screenshot = enabled;
        self
    }

    #[must_use]
    pub fn full_reload(mut self, enabled: bool) -> Self {
        self.config.full_reload = enabled;
        self
    }

    /// Tier A retry ceiling: `limit` relaunches after the first attempt.
    #[must_use]
    pub fn main_retry_limit(mut self, limit: u32) -> Self {
        self.config.main_retry_limit = limit;
        self
    }

    #[must_use]
    pub fn main_retry_wait_secs(mut self, secs: u64) -> Self {
        self.config.main_retry_wait_secs = secs;
        self
    }

    /// Tier B retry ceiling: `limit` session restarts after the first attempt.
    #[must_use]
    pub fn task_retry_limit(mut self, limit: u32) -> Self {
        self.config.task_retry_limit = limit;
        self
    }

    #[must_use]
    pub fn task_retry_wait_secs(mut self, secs: u64) -> Self {
        self.config.task_retry_wait_secs = secs;
        self
    }

    #[must_use]
    pub fn extract_attempt_limit(mut self, limit: u32) -> Self {
        self.config.extract_attempt_limit = limit;
        self
    }

    #[must_use]
    pub fn extract_reload_limit(mut self, limit: u32) -> Self {
        self.config.extract_reload_limit = limit;
        self
    }

    #[must_use]
    pub fn pagination_stall_limit(mut self, limit: u32) -> Self {
        self.config.pagination_stall_limit = limit;
        self
    }

    #[must_use]
    pub fn step_delay_ms(mut self, millis: u64) -> Self {
        self.config.step_delay_ms = millis;
        self
    }

    #[must_use]
    pub fn page_load_timeout_secs(mut self, secs: u64) -> Self {
        self.config.page_load_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn connectivity_host(mut self, host: impl Into<String>) -> Self {
        self.config.connectivity_host = host.into();
        self
    }

    #[must_use]
    pub fn connectivity_interval_secs(mut self, secs: u64) -> Self {
        self.config.connectivity_interval_secs = secs;
        self
    }

    #[must_use]
    pub fn launch_mode(mut self, mode: LaunchMode) -> Self {
        self.config.launch_mode = mode;
        self
    }
}
