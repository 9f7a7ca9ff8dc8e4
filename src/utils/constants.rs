//! Shared configuration constants for photoscrape
//!
//! Default values and hard limits used throughout the codebase to keep the
//! config defaults, the builder, and the loader in agreement.

/// Hard ceiling for the process-level (Tier A) retry budget.
pub const MAX_MAIN_RETRY_LIMIT: u32 = 120;

/// Default process-level retry budget.
///
/// Long crawls routinely outlive several network hiccups, so the default
/// sits at the hard ceiling.
pub const DEFAULT_MAIN_RETRY_LIMIT: u32 = MAX_MAIN_RETRY_LIMIT;

/// Default wait between process-level relaunches: 60 seconds
pub const DEFAULT_MAIN_RETRY_WAIT_SECS: u64 = 60;

/// Hard ceiling for the task-level (Tier B) retry budget inside a worker.
pub const MAX_TASK_RETRY_LIMIT: u32 = 10;

/// Default task-level retry budget.
pub const DEFAULT_TASK_RETRY_LIMIT: u32 = MAX_TASK_RETRY_LIMIT;

/// Default wait between task-level retries: 5 seconds
pub const DEFAULT_TASK_RETRY_WAIT_SECS: u64 = 5;

/// Extraction attempts before the page is force-reloaded.
pub const DEFAULT_EXTRACT_ATTEMPT_LIMIT: u32 = 10;

/// Forced reloads before extraction gives up on a photo.
pub const DEFAULT_EXTRACT_RELOAD_LIMIT: u32 = 3;

/// "Next" clicks without an identity change before the album is
/// considered finished.
///
/// At the default step delay this is ~20 seconds of a frozen viewer.
pub const DEFAULT_PAGINATION_STALL_LIMIT: u32 = 40;

/// Pause after every UI action (click, read-more, download): 500ms
pub const DEFAULT_STEP_DELAY_MS: u64 = 500;

/// Timeout for `page.goto()` plus the load wait that follows it.
pub const DEFAULT_PAGE_LOAD_TIMEOUT_SECS: u64 = 60;

/// Host resolved by the connectivity gate.
pub const DEFAULT_CONNECTIVITY_HOST: &str = "www.google.com";

/// Re-probe interval while the connectivity gate is closed: 60 seconds
pub const DEFAULT_CONNECTIVITY_INTERVAL_SECS: u64 = 60;

/// Upper bound accepted for any configured wait, in seconds.
pub const MAX_WAIT_SECS: u64 = 3600;

/// Query parameter of the photo viewer URL that carries the photo id.
pub const PHOTO_ID_PARAM: &str = "fbid";

/// Chrome user agent string used for the browser and the image downloader
///
/// Keeping both on the same UA avoids the CDN answering the downloader with
/// a different (or blocked) rendition than the one the page displayed.
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";

/// Browser viewport, matching a common desktop resolution.
pub const VIEWPORT_WIDTH: u32 = 1920;
pub const VIEWPORT_HEIGHT: u32 = 1080;

/// Exit code of a worker that failed after exhausting its retry budget.
pub const WORKER_EXIT_FAILURE: i32 = 1;

/// Exit code of a worker stopped by an operator interrupt.
pub const WORKER_EXIT_INTERRUPTED: i32 = 130;

/// How long a worker gets to save progress after a forwarded interrupt.
pub const WORKER_SHUTDOWN_GRACE_SECS: u64 = 15;
