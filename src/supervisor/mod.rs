//! Retry supervision.
//!
//! Three tiers, outer to inner:
//!
//! - Tier A ([`Supervisor`]): relaunches a fresh browser session, up to
//!   `mainRetryLimit` retries, and writes the RecoveryLog when it gives up.
//! - Tier B ([`run_worker`]): restarts the fetch session inside one browser,
//!   up to `taskRetryLimit` retries.
//! - Tier C ([`wait_for_connectivity`]): holds every retry until DNS
//!   resolves again, without spending budget.

pub mod connectivity;
pub mod coordinator;
pub mod handoff;
pub mod launcher;
pub mod retry;
pub mod shutdown;
pub mod worker;

pub use connectivity::{ConnectivityProbe, DnsProbe, wait_for_connectivity};
pub use coordinator::{RunSummary, Supervisor};
pub use launcher::{InProcessLauncher, LaunchFailure, ProcessLauncher, SessionLauncher, worker_outcome};
pub use retry::{RetryPolicy, RetryState};
pub use shutdown::{AttemptInterrupted, InterruptSignal, spawn_interrupt_handler};
pub use worker::{
    WorkerFailure, WorkerSettings, run_attempt, run_browser_attempt, run_worker, worker_main,
};
