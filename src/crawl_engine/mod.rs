//! The resumable crawl loop: pagination, per-photo processing and the
//! session state machine that composes them.

pub mod crawl_types;
pub mod fetch_session;
pub mod page_timeout;
pub mod paginator;

pub use crawl_types::{CrawlError, CrawlResult, FetchError, SessionReport, Termination};
pub use fetch_session::{FetchSession, SessionPhase, SessionSettings};
pub use paginator::{Advance, PaginatePolicy, Paginator};
