//! Timestamp helpers for artifact file names.

use chrono::{DateTime, Local, Utc};

/// Sortable local timestamp with millisecond precision, e.g. `20260119_142233123`.
#[must_use]
pub fn file_timestamp() -> String {
    format_file_timestamp(Local::now())
}

/// Format a timestamp the way artifact file names expect it.
#[must_use]
pub fn format_file_timestamp(at: DateTime<Local>) -> String {
    at.format("%Y%m%d_%H%M%S%3f").to_string()
}

/// Milliseconds since the Unix epoch.
#[must_use]
pub fn epoch_millis() -> i64 {
    Utc::now().timestamp_millis()
}
