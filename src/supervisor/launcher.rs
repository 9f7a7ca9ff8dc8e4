//! How Tier A starts one attempt on a fresh browser.

use anyhow::{Context, anyhow};
use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::handoff::{receive_report, send_snapshot};
use super::shutdown::{AttemptInterrupted, InterruptSignal};
use super::worker::run_browser_attempt;
use crate::config::CrawlConfig;
use crate::crawl_state::{CrawlSnapshot, CrawlState};
use crate::utils::{WORKER_EXIT_FAILURE, WORKER_EXIT_INTERRUPTED, WORKER_SHUTDOWN_GRACE_SECS};

/// Why an attempt did not complete. Both variants carry the freshest
/// snapshot the attempt produced, when there is one.
#[derive(Debug, Clone, PartialEq)]
pub enum LaunchFailure {
    Failed {
        message: String,
        snapshot: Option<CrawlSnapshot>,
    },
    /// `saved` is set when the attempt already wrote its own RecoveryLog.
    Interrupted {
        snapshot: Option<CrawlSnapshot>,
        saved: bool,
    },
}

pub trait SessionLauncher: Send + Sync {
    /// Run one attempt seeded with `seed`, returning the final snapshot.
    fn launch(
        &self,
        seed: CrawlSnapshot,
    ) -> impl Future<Output = Result<CrawlSnapshot, LaunchFailure>> + Send;
}

/// Map a finished worker process onto an attempt result.
///
/// `code` is `None` when the worker was killed by a signal; `snapshot` is
/// the last report it wrote to stdout.
pub fn worker_outcome(
    code: Option<i32>,
    snapshot: Option<CrawlSnapshot>,
) -> Result<CrawlSnapshot, LaunchFailure> {
    match code {
        Some(0) => snapshot.ok_or_else(|| LaunchFailure::Failed {
            message: "worker exited without reporting a snapshot".to_string(),
            snapshot: None,
        }),
        Some(WORKER_EXIT_INTERRUPTED) => Err(LaunchFailure::Interrupted {
            snapshot,
            saved: true,
        }),
        Some(WORKER_EXIT_FAILURE) => Err(LaunchFailure::Failed {
            message: "worker exhausted its task retries".to_string(),
            snapshot,
        }),
        Some(code) => Err(LaunchFailure::Failed {
            message: format!("worker exited with code {code}"),
            snapshot,
        }),
        None => Err(LaunchFailure::Failed {
            message: "worker killed by signal".to_string(),
            snapshot,
        }),
    }
}

#[cfg(unix)]
fn forward_interrupt(pid: Option<u32>) {
    let Some(pid) = pid.and_then(|pid| i32::try_from(pid).ok()) else {
        return;
    };
    // SAFETY: kill(2) only delivers a signal to our own child process.
    if unsafe { libc::kill(pid, libc::SIGINT) } != 0 {
        warn!(pid, "Could not forward interrupt to worker");
    }
}

// Console Ctrl+C already reaches the whole process group; a worker that
// misses it is killed once the grace period ends.
#[cfg(not(unix))]
fn forward_interrupt(_pid: Option<u32>) {}

/// Re-executes this binary as `<exe> --config <path> --target-url <url> worker`
/// per attempt.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    exe: PathBuf,
    config_path: PathBuf,
    target_url: String,
    interrupt: InterruptSignal,
}

impl ProcessLauncher {
    /// `target_url` is forwarded so a command-line override reaches the worker.
    pub fn new(
        config_path: impl Into<PathBuf>,
        target_url: impl Into<String>,
        interrupt: InterruptSignal,
    ) -> anyhow::Result<Self> {
        let exe = std::env::current_exe().context("Failed to locate current executable")?;
        Ok(Self {
            exe,
            config_path: config_path.into(),
            target_url: target_url.into(),
            interrupt,
        })
    }

    async fn run_child(&self, seed: &CrawlSnapshot) -> anyhow::Result<(Option<i32>, Option<CrawlSnapshot>)> {
        let mut child = Command::new(&self.exe)
            .arg("--config")
            .arg(&self.config_path)
            .arg("--target-url")
            .arg(&self.target_url)
            .arg("worker")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to spawn worker {}", self.exe.display()))?;
        let pid = child.id();
        debug!(?pid, "Worker started");

        let stdin = child.stdin.take().context("Worker stdin unavailable")?;
        let stdout = child.stdout.take().context("Worker stdout unavailable")?;

        let exchange = async {
            send_snapshot(stdin, seed).await?;
            let report = receive_report(stdout).await?;
            let status = child.wait().await.context("Failed to wait for worker")?;
            debug!(%status, "Worker exited");
            Ok::<_, anyhow::Error>((status.code(), report))
        };
        tokio::pin!(exchange);

        tokio::select! {
            result = &mut exchange => return result,
            () = self.interrupt.raised() => {}
        }

        info!(?pid, "Forwarding interrupt to worker");
        forward_interrupt(pid);
        let grace = Duration::from_secs(WORKER_SHUTDOWN_GRACE_SECS);
        match tokio::time::timeout(grace, exchange).await {
            Ok(result) => result,
            // Dropping the child kills it.
            Err(_) => Err(anyhow!(
                "worker did not stop within {WORKER_SHUTDOWN_GRACE_SECS}s of the interrupt"
            )),
        }
    }
}

impl SessionLauncher for ProcessLauncher {
    async fn launch(&self, seed: CrawlSnapshot) -> Result<CrawlSnapshot, LaunchFailure> {
        let result = match self.run_child(&seed).await {
            Ok((code, snapshot)) => worker_outcome(code, snapshot),
            Err(e) => Err(LaunchFailure::Failed {
                message: format!("{e:#}"),
                snapshot: None,
            }),
        };

        match result {
            // The worker died before it could save, so the supervisor has to.
            Err(LaunchFailure::Failed { snapshot, .. }) if self.interrupt.is_raised() => {
                Err(LaunchFailure::Interrupted {
                    snapshot,
                    saved: false,
                })
            }
            other => other,
        }
    }
}

/// Runs the worker loop on a fresh browser inside this process, writing
/// straight into the coordinator's state.
#[derive(Debug, Clone)]
pub struct InProcessLauncher {
    config: CrawlConfig,
    state: CrawlState,
    interrupt: InterruptSignal,
}

impl InProcessLauncher {
    #[must_use]
    pub fn new(config: CrawlConfig, state: CrawlState, interrupt: InterruptSignal) -> Self {
        Self {
            config,
            state,
            interrupt,
        }
    }
}

impl SessionLauncher for InProcessLauncher {
    async fn launch(&self, seed: CrawlSnapshot) -> Result<CrawlSnapshot, LaunchFailure> {
        self.state.replace(seed);
        info!(url = %self.state.current_url(), "Starting in-process attempt");
        match run_browser_attempt(&self.config, &self.state, &self.interrupt).await {
            Ok(_) => Ok(self.state.snapshot()),
            Err(e) if e.is::<AttemptInterrupted>() => Err(LaunchFailure::Interrupted {
                snapshot: Some(self.state.snapshot()),
                saved: false,
            }),
            Err(e) => Err(LaunchFailure::Failed {
                message: format!("{e:#}"),
                snapshot: Some(self.state.snapshot()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress() -> CrawlSnapshot {
        CrawlSnapshot::fresh("https://host/photo/?fbid=7")
    }

    #[test]
    fn worker_exit_codes_map_to_attempt_results() {
        let cases: Vec<(Option<i32>, Option<CrawlSnapshot>, Result<CrawlSnapshot, LaunchFailure>)> = vec![
            (Some(0), Some(progress()), Ok(progress())),
            (
                Some(0),
                None,
                Err(LaunchFailure::Failed {
                    message: "worker exited without reporting a snapshot".to_string(),
                    snapshot: None,
                }),
            ),
            (
                Some(WORKER_EXIT_FAILURE),
                Some(progress()),
                Err(LaunchFailure::Failed {
                    message: "worker exhausted its task retries".to_string(),
                    snapshot: Some(progress()),
                }),
            ),
            (
                Some(WORKER_EXIT_INTERRUPTED),
                Some(progress()),
                Err(LaunchFailure::Interrupted {
                    snapshot: Some(progress()),
                    saved: true,
                }),
            ),
            (
                Some(101),
                Some(progress()),
                Err(LaunchFailure::Failed {
                    message: "worker exited with code 101".to_string(),
                    snapshot: Some(progress()),
                }),
            ),
            (
                None,
                None,
                Err(LaunchFailure::Failed {
                    message: "worker killed by signal".to_string(),
                    snapshot: None,
                }),
            ),
        ];

        for (code, snapshot, expected) in cases {
            assert_eq!(worker_outcome(code, snapshot), expected, "exit code {code:?}");
        }
    }
}
