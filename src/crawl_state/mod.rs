//! Crawl state shared between the fetch loop and the exit handlers
//!
//! `CrawlState` is the one object that knows "where are we": the fetch
//! session writes to it after every recorded photo, while interrupt and
//! failure handlers read a consistent snapshot out of it to build a
//! RecoveryLog. It is a cheap cloneable handle; clones observe the same state.

pub mod photo_map;
pub mod snapshot;

pub use photo_map::{PhotoMap, PhotoRecord};
pub use snapshot::CrawlSnapshot;

use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct CrawlState {
    inner: Arc<Mutex<CrawlSnapshot>>,
}

impl CrawlState {
    #[must_use]
    pub fn new(snapshot: CrawlSnapshot) -> Self {
        Self {
            inner: Arc::new(Mutex::new(snapshot)),
        }
    }

    #[must_use]
    pub fn current_url(&self) -> String {
        self.inner.lock().current_url.clone()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.inner.lock().photo_data.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().photo_data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().photo_data.is_empty()
    }

    /// Record a newly fetched photo and move the position onto it.
    ///
    /// The position only moves when the record is actually inserted, so the
    /// captured `currentUrl` always names the last record in the map.
    pub fn record(&self, record: PhotoRecord) -> bool {
        let mut guard = self.inner.lock();
        let url = record.source_url.clone();
        if guard.photo_data.insert(record) {
            guard.current_url = url;
            true
        } else {
            false
        }
    }

    /// Consistent copy of the whole state.
    #[must_use]
    pub fn snapshot(&self) -> CrawlSnapshot {
        self.inner.lock().clone()
    }

    /// Replace the state wholesale (resume from a RecoveryLog or a worker handoff).
    pub fn replace(&self, snapshot: CrawlSnapshot) {
        *self.inner.lock() = snapshot;
    }
}
