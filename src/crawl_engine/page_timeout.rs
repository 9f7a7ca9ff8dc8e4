//! Timeout wrapper for browser operations
//!
//! A CDP call against a wedged renderer never resolves on its own; every
//! page operation the driver issues goes through here.

use anyhow::Result;
use std::future::Future;
use std::time::Duration;

/// Run `operation` with an explicit deadline.
///
/// The error names the operation so timeout and operation failures stay
/// distinguishable in the logs.
pub async fn with_page_timeout<F, T>(operation: F, timeout: Duration, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result,
        Err(_) => Err(anyhow::anyhow!(
            "{operation_name} timeout after {} seconds",
            timeout.as_secs()
        )),
    }
}
