//! The browser capability the crawl loop drives.
//!
//! Everything above this trait (extractor, paginator, fetch session) is
//! written against `PageDriver`, so the whole crawl state machine can run
//! against a scripted page in tests. `ChromiumDriver` is the production
//! implementation.

pub mod chromium;
pub mod cookies;
pub mod page_load;

pub use chromium::ChromiumDriver;
pub use cookies::{StoredCookie, load_cookies};

use anyhow::Result;
use serde_json::Value;
use std::future::Future;
use std::path::Path;

/// One browser page, exclusively owned by a single crawl attempt.
pub trait PageDriver: Send {
    /// Navigate and wait until the document has settled.
    fn navigate(&mut self, url: &str) -> impl Future<Output = Result<()>> + Send;

    /// Evaluate a script in the page and return its JSON value
    /// (`Value::Null` for `undefined`).
    fn evaluate(&mut self, script: &str) -> impl Future<Output = Result<Value>> + Send;

    /// Click the first element matching `selector`.
    ///
    /// Returns `false` when nothing matches; that is not an error.
    fn click(&mut self, selector: &str) -> impl Future<Output = Result<bool>> + Send;

    /// URL the page currently shows.
    fn current_url(&mut self) -> impl Future<Output = Result<String>> + Send;

    /// Hard-reload the current page.
    fn reload(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Save a JPEG screenshot of the viewport to `path`.
    fn screenshot(&mut self, path: &Path) -> impl Future<Output = Result<()>> + Send;

    /// Install session cookies; must run before the first navigation.
    fn apply_cookies(&mut self, cookies: &[StoredCookie]) -> impl Future<Output = Result<()>> + Send;

    /// Release the page and whatever owns it.
    fn close(self) -> impl Future<Output = Result<()>> + Send
    where
        Self: Sized;
}
