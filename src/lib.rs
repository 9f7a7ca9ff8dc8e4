//! Resumable photo-album crawler.
//!
//! Opens a photo viewer in Chromium, downloads each photo and follows the
//! viewer's "next" control until the album cycles back to a photo it already
//! has. Progress lives in a [`CrawlState`]; when every retry tier is spent,
//! or the operator interrupts, it is written to a RecoveryLog that the next
//! run can resume from.

pub mod browser_setup;
pub mod config;
pub mod content_saver;
pub mod crawl_engine;
pub mod crawl_state;
pub mod logging;
pub mod page_driver;
pub mod page_extractor;
pub mod recovery;
pub mod supervisor;
pub mod utils;

pub use browser_setup::{download_managed_browser, find_browser_executable, launch_browser};
pub use config::{ConfigError, CrawlConfig, LaunchMode};
pub use content_saver::{HttpDownloader, ImageDownloader};
pub use crawl_engine::{
    CrawlError, CrawlResult, FetchError, FetchSession, SessionPhase, SessionReport, Termination,
};
pub use crawl_state::{CrawlSnapshot, CrawlState, PhotoMap, PhotoRecord};
pub use page_driver::{ChromiumDriver, PageDriver};
pub use recovery::{RecoveryError, RecoveryLogStore, StartMode};
pub use supervisor::{
    InProcessLauncher, ProcessLauncher, RunSummary, SessionLauncher, Supervisor,
};
