//! Connectivity gate (Tier C).
//!
//! Retries only make sense while the network is up. Before any retry the
//! tiers wait here until a DNS probe succeeds; waiting does not consume
//! retry budget.

use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

pub trait ConnectivityProbe: Send + Sync {
    fn is_online(&self) -> impl Future<Output = bool> + Send;
}

/// Resolves a well-known host name.
#[derive(Debug, Clone)]
pub struct DnsProbe {
    host: String,
}

impl DnsProbe {
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }
}

impl ConnectivityProbe for DnsProbe {
    async fn is_online(&self) -> bool {
        match tokio::net::lookup_host((self.host.as_str(), 443)).await {
            Ok(mut addrs) => addrs.next().is_some(),
            Err(e) => {
                debug!(host = %self.host, "DNS probe failed: {e}");
                false
            }
        }
    }
}

/// Block until `probe` reports connectivity, re-probing every `interval`.
///
/// Returns how many failed probes were waited out.
pub async fn wait_for_connectivity<P: ConnectivityProbe>(probe: &P, interval: Duration) -> u32 {
    let mut failed = 0;
    while !probe.is_online().await {
        failed += 1;
        warn!(
            failed_probes = failed,
            "No internet connection, checking again in {}s",
            interval.as_secs()
        );
        tokio::time::sleep(interval).await;
    }
    failed
}
