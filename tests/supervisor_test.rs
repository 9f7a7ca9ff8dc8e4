//! Retry tiers: budgets, restart position and the connectivity gate.

use photoscrape::crawl_engine::{CrawlError, FetchError};
use photoscrape::crawl_state::{CrawlSnapshot, CrawlState, PhotoRecord};
use photoscrape::recovery::RecoveryLogStore;
use photoscrape::supervisor::handoff::{receive_report, receive_seed, send_snapshot};
use photoscrape::supervisor::{
    AttemptInterrupted, InterruptSignal, LaunchFailure, RetryPolicy, RunSummary, SessionLauncher,
    Supervisor, run_attempt, run_worker, worker_outcome,
};
use photoscrape::utils::{WORKER_EXIT_FAILURE, WORKER_EXIT_INTERRUPTED};
use std::sync::atomic::Ordering;
use std::time::Duration;
use tempfile::TempDir;

mod common;
use common::{FakeDownloader, FakeLauncher, FakePage, FakeProbe, image_url, photo_url, worker_settings};

fn snapshot_with(ids: &[&str]) -> CrawlSnapshot {
    let mut snapshot = CrawlSnapshot::fresh(photo_url(ids.first().copied().unwrap_or("1")));
    for id in ids {
        snapshot.photo_data.insert(PhotoRecord::new(
            *id,
            photo_url(id),
            image_url(id),
            format!("caption {id}"),
        ));
        snapshot.current_url = photo_url(id);
    }
    snapshot
}

// ---------------------------------------------------------------------------
// Tier B
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_worker_gives_up_after_limit_plus_one_attempts() {
    let dir = TempDir::new().unwrap();
    let settings = worker_settings(dir.path(), 2);
    let mut page = FakePage::album(&["1", "2"]).failing_at("1", u32::MAX);
    let downloader = FakeDownloader::default();
    let probe = FakeProbe::online();
    let state = CrawlState::new(CrawlSnapshot::fresh(photo_url("1")));

    let failure = run_worker(&mut page, &downloader, &probe, &state, &settings)
        .await
        .unwrap_err();

    assert_eq!(failure.attempts, 3);
    assert!(matches!(failure.last_error, FetchError::Page(_)));
    assert_eq!(page.navigations.len(), 3);
    assert_eq!(page.info_reads, 3);
    assert!(state.is_empty());
}

#[tokio::test]
async fn test_worker_with_zero_limit_tries_once() {
    let dir = TempDir::new().unwrap();
    let settings = worker_settings(dir.path(), 0);
    let mut page = FakePage::album(&["1"]).failing_at("1", u32::MAX);
    let probe = FakeProbe::online();
    let state = CrawlState::new(CrawlSnapshot::fresh(photo_url("1")));

    let failure = run_worker(&mut page, &FakeDownloader::default(), &probe, &state, &settings)
        .await
        .unwrap_err();

    assert_eq!(failure.attempts, 1);
    assert_eq!(probe.probe_count(), 0);
}

#[tokio::test]
async fn test_worker_retry_resumes_from_last_completed_photo() {
    let dir = TempDir::new().unwrap();
    let settings = worker_settings(dir.path(), 3);
    let mut page = FakePage::album(&["1", "2", "3"]).failing_at("3", 1);
    let downloader = FakeDownloader::default();
    let probe = FakeProbe::online();
    let state = CrawlState::new(CrawlSnapshot::fresh(photo_url("1")));

    let report = run_worker(&mut page, &downloader, &probe, &state, &settings)
        .await
        .unwrap();

    assert_eq!(report.total_photos, 3);
    assert_eq!(page.navigations, vec![photo_url("1"), photo_url("2")]);
    assert_eq!(
        downloader.downloaded(),
        vec![image_url("1"), image_url("2"), image_url("3")]
    );
    assert_eq!(
        state.snapshot().photo_data.ids().collect::<Vec<_>>(),
        vec!["1", "2", "3"]
    );
}

#[tokio::test]
async fn test_offline_wait_does_not_consume_task_budget() {
    let dir = TempDir::new().unwrap();
    let settings = worker_settings(dir.path(), 1);
    let mut page = FakePage::album(&["1", "2"]).failing_at("1", 1);
    let probe = FakeProbe::offline_for(4);
    let state = CrawlState::new(CrawlSnapshot::fresh(photo_url("1")));

    let report = run_worker(&mut page, &FakeDownloader::default(), &probe, &state, &settings)
        .await
        .unwrap();

    assert_eq!(report.total_photos, 2);
    // Four failed probes, then the one that let the retry through
    assert_eq!(probe.probe_count(), 5);
}

// ---------------------------------------------------------------------------
// Tier A
// ---------------------------------------------------------------------------

fn supervisor<'a>(
    launcher: &'a FakeLauncher,
    probe: &'a FakeProbe,
    store: &'a RecoveryLogStore,
    limit: u32,
) -> Supervisor<'a, FakeLauncher, FakeProbe> {
    Supervisor::new(
        launcher,
        probe,
        store,
        RetryPolicy::new(limit, Duration::ZERO),
        Duration::from_millis(1),
    )
}

#[tokio::test]
async fn test_exhausted_budget_writes_one_recovery_log() {
    let dir = TempDir::new().unwrap();
    let store = RecoveryLogStore::new(dir.path().join("fail"));
    let progress = snapshot_with(&["1", "2"]);
    let launcher = FakeLauncher::scripted(vec![Err(LaunchFailure::Failed {
        message: "task retry limit reached".to_string(),
        snapshot: Some(progress.clone()),
    })]);
    let probe = FakeProbe::online();
    let state = CrawlState::new(CrawlSnapshot::fresh(photo_url("1")));

    let err = supervisor(&launcher, &probe, &store, 3)
        .run(&state)
        .await
        .unwrap_err();

    let CrawlError::RetryLimitReached {
        attempts,
        recovery_log,
    } = err
    else {
        panic!("expected RetryLimitReached");
    };
    assert_eq!(attempts, 4);
    assert_eq!(launcher.launches(), 4);

    let logs = store.list().await.unwrap();
    assert_eq!(logs, vec![recovery_log.clone()]);
    assert_eq!(store.read(&recovery_log).await.unwrap(), progress);
}

#[tokio::test]
async fn test_each_relaunch_is_seeded_with_latest_progress() {
    let dir = TempDir::new().unwrap();
    let store = RecoveryLogStore::new(dir.path().join("fail"));
    let partial = snapshot_with(&["1"]);
    let complete = snapshot_with(&["1", "2", "3"]);
    let launcher = FakeLauncher::scripted(vec![
        Err(LaunchFailure::Failed {
            message: "browser crashed".to_string(),
            snapshot: Some(partial.clone()),
        }),
        Err(LaunchFailure::Failed {
            message: "worker killed by signal".to_string(),
            snapshot: None,
        }),
        Ok(complete.clone()),
    ]);
    let probe = FakeProbe::online();
    let seed = CrawlSnapshot::fresh(photo_url("1"));
    let state = CrawlState::new(seed.clone());

    let summary = supervisor(&launcher, &probe, &store, 5)
        .run(&state)
        .await
        .unwrap();

    assert_eq!(
        summary,
        RunSummary {
            attempts: 3,
            photos: 3
        }
    );
    let seeds = launcher.seeds.lock().unwrap().clone();
    assert_eq!(seeds, vec![seed, partial.clone(), partial]);
    assert_eq!(state.snapshot(), complete);
    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_interrupted_worker_leaves_log_writing_to_worker() {
    let dir = TempDir::new().unwrap();
    let store = RecoveryLogStore::new(dir.path().join("fail"));
    let progress = snapshot_with(&["1", "2"]);
    let launcher = FakeLauncher::scripted(vec![Err(LaunchFailure::Interrupted {
        snapshot: Some(progress.clone()),
        saved: true,
    })]);
    let probe = FakeProbe::online();
    let state = CrawlState::new(CrawlSnapshot::fresh(photo_url("1")));

    let err = supervisor(&launcher, &probe, &store, 10)
        .run(&state)
        .await
        .unwrap_err();

    assert!(matches!(err, CrawlError::Interrupted));
    assert_eq!(launcher.launches(), 1);
    assert_eq!(state.snapshot(), progress);
    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_relaunch_waits_for_connectivity() {
    let dir = TempDir::new().unwrap();
    let store = RecoveryLogStore::new(dir.path().join("fail"));
    let launcher = FakeLauncher::scripted(vec![
        Err(LaunchFailure::Failed {
            message: "navigation failed".to_string(),
            snapshot: None,
        }),
        Ok(CrawlSnapshot::fresh(photo_url("1"))),
    ]);
    let probe = FakeProbe::offline_for(3);
    let state = CrawlState::new(CrawlSnapshot::fresh(photo_url("1")));

    let summary = supervisor(&launcher, &probe, &store, 1)
        .run(&state)
        .await
        .unwrap();

    assert_eq!(summary.attempts, 2);
    assert_eq!(probe.probe_count(), 4);
}

#[tokio::test]
async fn test_unsaved_interrupt_is_written_by_supervisor() {
    let dir = TempDir::new().unwrap();
    let store = RecoveryLogStore::new(dir.path().join("fail"));
    let progress = snapshot_with(&["1", "2", "3"]);
    let launcher = FakeLauncher::scripted(vec![Err(LaunchFailure::Interrupted {
        snapshot: Some(progress.clone()),
        saved: false,
    })]);
    let probe = FakeProbe::online();
    let state = CrawlState::new(CrawlSnapshot::fresh(photo_url("1")));

    let err = supervisor(&launcher, &probe, &store, 10)
        .run(&state)
        .await
        .unwrap_err();

    assert!(matches!(err, CrawlError::Interrupted));
    let logs = store.list().await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(store.read(&logs[0]).await.unwrap(), progress);
}

#[tokio::test]
async fn test_raised_interrupt_stops_before_next_launch() {
    let dir = TempDir::new().unwrap();
    let store = RecoveryLogStore::new(dir.path().join("fail"));
    let launcher = FakeLauncher::scripted(vec![Ok(snapshot_with(&["1"]))]);
    let probe = FakeProbe::online();
    let progress = snapshot_with(&["1", "2"]);
    let state = CrawlState::new(progress.clone());
    let interrupt = InterruptSignal::new();
    interrupt.trigger();

    let err = supervisor(&launcher, &probe, &store, 10)
        .with_interrupt(interrupt)
        .run(&state)
        .await
        .unwrap_err();

    assert!(matches!(err, CrawlError::Interrupted));
    assert_eq!(launcher.launches(), 0);
    let logs = store.list().await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(store.read(&logs[0]).await.unwrap(), progress);
}

#[tokio::test]
async fn test_interrupt_during_connectivity_wait_saves_progress() {
    let dir = TempDir::new().unwrap();
    let store = RecoveryLogStore::new(dir.path().join("fail"));
    let progress = snapshot_with(&["1", "2"]);
    let launcher = FakeLauncher::scripted(vec![Err(LaunchFailure::Failed {
        message: "navigation failed".to_string(),
        snapshot: Some(progress.clone()),
    })]);
    // Never comes back online
    let probe = FakeProbe::offline_for(u32::MAX);
    let state = CrawlState::new(CrawlSnapshot::fresh(photo_url("1")));
    let interrupt = InterruptSignal::new();

    let trigger = {
        let interrupt = interrupt.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            interrupt.trigger();
        })
    };

    let err = tokio::time::timeout(
        Duration::from_secs(5),
        supervisor(&launcher, &probe, &store, 10)
            .with_interrupt(interrupt)
            .run(&state),
    )
    .await
    .expect("interrupt should end the wait")
    .unwrap_err();
    trigger.await.unwrap();

    assert!(matches!(err, CrawlError::Interrupted));
    assert_eq!(launcher.launches(), 1);
    assert!(probe.probe_count() >= 1);
    let logs = store.list().await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(store.read(&logs[0]).await.unwrap(), progress);
}

// ---------------------------------------------------------------------------
// One attempt on an open page
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_attempt_closes_page_after_success() {
    let dir = TempDir::new().unwrap();
    let settings = worker_settings(dir.path(), 0);
    let page = FakePage::album(&["1", "2"]);
    let closed = page.closed.clone();
    let state = CrawlState::new(CrawlSnapshot::fresh(photo_url("1")));

    let report = run_attempt(
        page,
        &[],
        &FakeDownloader::default(),
        &FakeProbe::online(),
        &state,
        &settings,
        &InterruptSignal::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.total_photos, 2);
    assert!(closed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_interrupted_attempt_still_closes_page() {
    let dir = TempDir::new().unwrap();
    let settings = worker_settings(dir.path(), 0);
    let page = FakePage::album(&["1", "2"]);
    let closed = page.closed.clone();
    let progress = snapshot_with(&["1"]);
    let state = CrawlState::new(progress.clone());
    let interrupt = InterruptSignal::new();
    interrupt.trigger();

    let err = run_attempt(
        page,
        &[],
        &FakeDownloader::default(),
        &FakeProbe::online(),
        &state,
        &settings,
        &interrupt,
    )
    .await
    .unwrap_err();

    assert!(err.is::<AttemptInterrupted>());
    assert!(closed.load(Ordering::SeqCst));
    assert_eq!(state.snapshot(), progress);
}

// ---------------------------------------------------------------------------
// Worker process contract over the snapshot channel
// ---------------------------------------------------------------------------

/// Plays a worker process over in-memory pipes: reads the seed, records
/// `found`, reports its snapshot and "exits" with `exit_code`.
struct PipedWorkerLauncher {
    found: Vec<&'static str>,
    exit_code: i32,
}

impl SessionLauncher for PipedWorkerLauncher {
    async fn launch(&self, seed: CrawlSnapshot) -> Result<CrawlSnapshot, LaunchFailure> {
        let (to_worker, worker_stdin) = tokio::io::duplex(64 * 1024);
        let (worker_stdout, from_worker) = tokio::io::duplex(64 * 1024);
        let found = self.found.clone();

        let worker = tokio::spawn(async move {
            let state = CrawlState::new(receive_seed(worker_stdin).await.unwrap());
            for id in found {
                state.record(PhotoRecord::new(id, photo_url(id), image_url(id), format!("caption {id}")));
            }
            send_snapshot(worker_stdout, &state.snapshot()).await.unwrap();
        });

        send_snapshot(to_worker, &seed).await.unwrap();
        let report = receive_report(from_worker).await.unwrap();
        worker.await.unwrap();
        worker_outcome(Some(self.exit_code), report)
    }
}

#[tokio::test]
async fn test_failed_worker_report_reaches_supervisor_state() {
    let dir = TempDir::new().unwrap();
    let store = RecoveryLogStore::new(dir.path().join("fail"));
    let launcher = PipedWorkerLauncher {
        found: vec!["1", "2"],
        exit_code: WORKER_EXIT_FAILURE,
    };
    let probe = FakeProbe::online();
    let state = CrawlState::new(CrawlSnapshot::fresh(photo_url("1")));

    let err = Supervisor::new(&launcher, &probe, &store, RetryPolicy::new(0, Duration::ZERO), Duration::from_millis(1))
        .run(&state)
        .await
        .unwrap_err();

    assert!(matches!(err, CrawlError::RetryLimitReached { attempts: 1, .. }));
    assert_eq!(state.snapshot(), snapshot_with(&["1", "2"]));
    let logs = store.list().await.unwrap();
    assert_eq!(store.read(&logs[0]).await.unwrap(), snapshot_with(&["1", "2"]));
}

#[tokio::test]
async fn test_interrupted_worker_report_is_kept_without_second_log() {
    let dir = TempDir::new().unwrap();
    let store = RecoveryLogStore::new(dir.path().join("fail"));
    let launcher = PipedWorkerLauncher {
        found: vec!["1"],
        exit_code: WORKER_EXIT_INTERRUPTED,
    };
    let probe = FakeProbe::online();
    let state = CrawlState::new(CrawlSnapshot::fresh(photo_url("1")));

    let err = Supervisor::new(&launcher, &probe, &store, RetryPolicy::new(5, Duration::ZERO), Duration::from_millis(1))
        .run(&state)
        .await
        .unwrap_err();

    assert!(matches!(err, CrawlError::Interrupted));
    assert_eq!(state.snapshot(), snapshot_with(&["1"]));
    assert!(store.list().await.unwrap().is_empty());
}
