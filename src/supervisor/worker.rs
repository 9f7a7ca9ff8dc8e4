//! Tier B: task-level retries around the fetch session, inside one browser.

use anyhow::Context;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

use super::connectivity::{ConnectivityProbe, DnsProbe, wait_for_connectivity};
use super::handoff::{receive_seed, send_snapshot};
use super::retry::RetryPolicy;
use super::shutdown::{AttemptInterrupted, InterruptSignal};
use crate::config::CrawlConfig;
use crate::content_saver::{HttpDownloader, ImageDownloader};
use crate::crawl_engine::{FetchError, FetchSession, SessionReport, SessionSettings};
use crate::crawl_state::CrawlState;
use crate::page_driver::{ChromiumDriver, PageDriver, StoredCookie, load_cookies};
use crate::recovery::RecoveryLogStore;
use crate::utils::{WORKER_EXIT_FAILURE, WORKER_EXIT_INTERRUPTED};

#[derive(Debug, Clone)]
pub struct WorkerSettings {
    pub session: SessionSettings,
    pub retry: RetryPolicy,
    pub connectivity_interval: Duration,
}

impl WorkerSettings {
    #[must_use]
    pub fn from_config(config: &CrawlConfig) -> Self {
        Self {
            session: SessionSettings::from_config(config),
            retry: RetryPolicy::new(config.task_retry_limit(), config.task_retry_wait()),
            connectivity_interval: config.connectivity_interval(),
        }
    }
}

/// Tier B gave up.
#[derive(Debug, Clone, Error)]
#[error("task retry limit reached after {attempts} attempts: {last_error}")]
pub struct WorkerFailure {
    pub attempts: u32,
    pub last_error: FetchError,
}

/// Run fetch sessions on `page` until one succeeds or the task budget is spent.
///
/// Every retry restarts from the state's current URL (the last completed
/// photo) with the accumulated photo map, never from the original target.
pub async fn run_worker<D, L, P>(
    page: &mut D,
    downloader: &L,
    probe: &P,
    state: &CrawlState,
    settings: &WorkerSettings,
) -> Result<SessionReport, WorkerFailure>
where
    D: PageDriver,
    L: ImageDownloader,
    P: ConnectivityProbe,
{
    let mut retry = settings.retry.start();

    loop {
        let attempt = retry.begin_attempt();
        let mut session = FetchSession::new(&mut *page, downloader, state.clone(), &settings.session);

        match session.run().await {
            Ok(report) => {
                info!(
                    new = report.new_photos,
                    total = report.total_photos,
                    termination = ?report.termination,
                    "Fetch session complete"
                );
                return Ok(report);
            }
            Err(last_error) if !retry.can_retry() => {
                return Err(WorkerFailure {
                    attempts: attempt,
                    last_error,
                });
            }
            Err(e) => {
                warn!(
                    attempt,
                    limit = retry.limit(),
                    resume_url = %state.current_url(),
                    "Task failed: {e}; retrying in {}s",
                    settings.retry.wait.as_secs()
                );
                wait_for_connectivity(probe, settings.connectivity_interval).await;
                tokio::time::sleep(settings.retry.wait).await;
            }
        }
    }
}

/// One attempt on an already open page: apply cookies, run Tier B until it
/// finishes or `interrupt` is raised, then close the page on every path.
///
/// An interrupt surfaces as [`AttemptInterrupted`]; `state` still holds the
/// last completed photo.
pub async fn run_attempt<D, L, P>(
    mut driver: D,
    cookies: &[StoredCookie],
    downloader: &L,
    probe: &P,
    state: &CrawlState,
    settings: &WorkerSettings,
    interrupt: &InterruptSignal,
) -> anyhow::Result<SessionReport>
where
    D: PageDriver,
    L: ImageDownloader,
    P: ConnectivityProbe,
{
    let outcome = match driver.apply_cookies(cookies).await {
        Ok(()) => tokio::select! {
            biased;
            () = interrupt.raised() => Err(anyhow::Error::new(AttemptInterrupted)),
            result = run_worker(&mut driver, downloader, probe, state, settings) => {
                result.map_err(anyhow::Error::new)
            }
        },
        Err(e) => Err(e),
    };

    if let Err(e) = driver.close().await {
        warn!("Browser cleanup failed: {e:#}");
    }
    outcome
}

/// One Tier A attempt on a real browser.
pub async fn run_browser_attempt(
    config: &CrawlConfig,
    state: &CrawlState,
    interrupt: &InterruptSignal,
) -> anyhow::Result<SessionReport> {
    let cookies = load_cookies(config.cookie_path()).await?;
    let downloader = HttpDownloader::new(config.page_load_timeout())?;
    let probe = DnsProbe::new(config.connectivity_host());
    let settings = WorkerSettings::from_config(config);

    let driver = ChromiumDriver::launch(config)
        .await
        .context("Failed to start browser session")?;

    run_attempt(driver, &cookies, &downloader, &probe, state, &settings, interrupt).await
}

/// Entry point of the hidden `worker` subcommand.
///
/// Reads the seed snapshot from stdin, runs one browser attempt and reports
/// the final snapshot on stdout. On operator interrupt the worker, which
/// holds the freshest state, closes its browser and writes the RecoveryLog
/// itself.
pub async fn worker_main(config: &CrawlConfig) -> i32 {
    let seed = match receive_seed(tokio::io::stdin()).await {
        Ok(seed) => seed,
        Err(e) => {
            error!("Worker could not read its seed snapshot: {e:#}");
            return WORKER_EXIT_FAILURE;
        }
    };
    let state = CrawlState::new(seed);

    let interrupt = InterruptSignal::new();
    let listener = {
        let interrupt = interrupt.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, saving progress");
                interrupt.trigger();
            }
        })
    };

    let code = match run_browser_attempt(config, &state, &interrupt).await {
        Ok(_) => 0,
        Err(e) if e.is::<AttemptInterrupted>() => {
            let store = RecoveryLogStore::new(config.fail_log_dir());
            match store.write(&state.snapshot()).await {
                Ok(path) => info!(path = %path.display(), "Progress saved"),
                Err(e) => error!("Failed to write recovery log: {e}"),
            }
            WORKER_EXIT_INTERRUPTED
        }
        Err(e) => {
            error!("Worker failed: {e:#}");
            WORKER_EXIT_FAILURE
        }
    };
    listener.abort();

    if let Err(e) = send_snapshot(tokio::io::stdout(), &state.snapshot()).await {
        error!("Failed to report snapshot to supervisor: {e:#}");
    }
    code
}
