//! Tier A: supervised relaunches of a fresh browser session.

use std::time::Duration;
use tracing::{error, info, warn};

use super::connectivity::{ConnectivityProbe, wait_for_connectivity};
use super::launcher::{LaunchFailure, SessionLauncher};
use super::retry::RetryPolicy;
use super::shutdown::InterruptSignal;
use crate::config::CrawlConfig;
use crate::crawl_engine::{CrawlError, CrawlResult};
use crate::crawl_state::CrawlState;
use crate::recovery::RecoveryLogStore;

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub attempts: u32,
    pub photos: usize,
}

pub struct Supervisor<'a, L, P> {
    launcher: &'a L,
    probe: &'a P,
    store: &'a RecoveryLogStore,
    retry: RetryPolicy,
    connectivity_interval: Duration,
    interrupt: InterruptSignal,
}

impl<'a, L: SessionLauncher, P: ConnectivityProbe> Supervisor<'a, L, P> {
    pub fn new(
        launcher: &'a L,
        probe: &'a P,
        store: &'a RecoveryLogStore,
        retry: RetryPolicy,
        connectivity_interval: Duration,
    ) -> Self {
        Self {
            launcher,
            probe,
            store,
            retry,
            connectivity_interval,
            interrupt: InterruptSignal::new(),
        }
    }

    /// Stop relaunching, and save progress, once `interrupt` is raised.
    #[must_use]
    pub fn with_interrupt(mut self, interrupt: InterruptSignal) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn from_config(launcher: &'a L, probe: &'a P, store: &'a RecoveryLogStore, config: &CrawlConfig) -> Self {
        Self::new(
            launcher,
            probe,
            store,
            RetryPolicy::new(config.main_retry_limit(), config.main_retry_wait()),
            config.connectivity_interval(),
        )
    }

    /// Launch attempts until one completes or the budget runs out.
    ///
    /// Each attempt is seeded from `state`, and `state` absorbs whatever the
    /// attempt reported back. When the budget is exhausted the state is
    /// written to a RecoveryLog, exactly once. An interrupt also ends in one
    /// RecoveryLog, written here unless the attempt already saved its own.
    pub async fn run(&self, state: &CrawlState) -> CrawlResult<RunSummary> {
        let mut retry = self.retry.start();

        loop {
            if self.interrupt.is_raised() {
                return self.save_interrupted(state).await;
            }

            let attempt = retry.begin_attempt();
            info!(attempt, max = retry.max_attempts(), url = %state.current_url(), "Launching crawl attempt");

            let (message, snapshot) = match self.launcher.launch(state.snapshot()).await {
                Ok(snapshot) => {
                    state.replace(snapshot);
                    return Ok(RunSummary {
                        attempts: attempt,
                        photos: state.len(),
                    });
                }
                Err(LaunchFailure::Interrupted { snapshot, saved }) => {
                    if let Some(snapshot) = snapshot {
                        state.replace(snapshot);
                    }
                    if saved {
                        info!("Worker saved progress before stopping");
                        return Err(CrawlError::Interrupted);
                    }
                    return self.save_interrupted(state).await;
                }
                Err(LaunchFailure::Failed { message, snapshot }) => (message, snapshot),
            };

            if let Some(snapshot) = snapshot {
                state.replace(snapshot);
            }

            if !retry.can_retry() {
                let recovery_log = self.store.write(&state.snapshot()).await?;
                error!(
                    attempts = attempt,
                    path = %recovery_log.display(),
                    "Crawler failed due to reaching the retry limit: {message}"
                );
                return Err(CrawlError::RetryLimitReached {
                    attempts: attempt,
                    recovery_log,
                });
            }

            warn!(
                attempt,
                limit = retry.limit(),
                "Attempt failed: {message}; waiting {}s before relaunch",
                self.retry.wait.as_secs()
            );
            let waited = tokio::select! {
                () = async {
                    wait_for_connectivity(self.probe, self.connectivity_interval).await;
                    tokio::time::sleep(self.retry.wait).await;
                } => true,
                () = self.interrupt.raised() => false,
            };
            if !waited {
                return self.save_interrupted(state).await;
            }
        }
    }

    async fn save_interrupted(&self, state: &CrawlState) -> CrawlResult<RunSummary> {
        let path = self.store.write(&state.snapshot()).await?;
        warn!(path = %path.display(), "Interrupted; progress saved");
        Err(CrawlError::Interrupted)
    }
}
