//! Operator interrupt handling.

use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::utils::WORKER_EXIT_INTERRUPTED;

/// Raised by the first Ctrl+C. Attempts, launchers and retry waits all stop
/// on it, so the RecoveryLog is written by whoever holds the freshest state
/// and the browser is closed before the process exits.
#[derive(Clone)]
pub struct InterruptSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl InterruptSignal {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    #[must_use]
    pub fn is_raised(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once the signal is raised (immediately if it already is).
    pub async fn raised(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|raised| *raised).await;
    }
}

impl Default for InterruptSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InterruptSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterruptSignal")
            .field("raised", &self.is_raised())
            .finish()
    }
}

/// A crawl attempt stopped because the interrupt was raised.
#[derive(Debug, Clone, Copy, Error)]
#[error("crawl attempt interrupted")]
pub struct AttemptInterrupted;

/// Listen for Ctrl+C for the lifetime of the process.
///
/// The first interrupt raises `interrupt`; the supervisor then saves progress
/// and returns. A second one exits at once with 130.
pub fn spawn_interrupt_handler(interrupt: InterruptSignal) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if tokio::signal::ctrl_c().await.is_err() {
                warn!("Could not install Ctrl+C handler");
                return;
            }
            if interrupt.is_raised() {
                warn!("Second interrupt, exiting without waiting for cleanup");
                std::process::exit(WORKER_EXIT_INTERRUPTED);
            }
            warn!("Interrupt received, saving progress");
            interrupt.trigger();
        }
    })
}
