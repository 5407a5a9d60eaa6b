//! Single-flight scheduling with retries.
//!
//! [`SyncScheduler`] keeps at most one orchestration pass in flight and
//! re-runs a pass that ended in [`WorkResult::Retry`], waiting out the
//! [`RetryPolicy`] backoff between attempts.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use deltasync_core::RetryPolicy;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::sync::Cancelled;
use crate::worker::{SyncWorker, WorkResult};

/// Scheduler errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SchedulerError {
    /// A run is already in flight; this request was dropped.
    #[error("a sync run is already in progress")]
    AlreadyRunning,

    /// The run was cancelled.
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

/// What a finished run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    /// Result of the last attempt.
    pub result: WorkResult,
    /// Passes executed, including the first.
    pub attempts: u32,
}

/// Runs a [`SyncWorker`] at most once at a time.
#[derive(Clone)]
pub struct SyncScheduler {
    worker: Arc<SyncWorker>,
    policy: RetryPolicy,
    running: Arc<AtomicBool>,
}

/// Clears the running flag when a run ends, however it ends.
struct RunGuard(Arc<AtomicBool>);

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SyncScheduler {
    /// Scheduler for `worker` with `policy`.
    pub fn new(worker: Arc<SyncWorker>, policy: RetryPolicy) -> Self {
        Self {
            worker,
            policy,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The worker being scheduled.
    pub fn worker(&self) -> &SyncWorker {
        &self.worker
    }

    /// True while a run is in flight.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Run the worker, retrying with backoff until it succeeds, attempts run
    /// out, or `token` is cancelled.
    ///
    /// Returns [`SchedulerError::AlreadyRunning`] without doing anything if
    /// another run is in flight.
    pub async fn run(&self, token: &CancellationToken) -> Result<RunReport, SchedulerError> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("sync run already in progress, skipping");
            return Err(SchedulerError::AlreadyRunning);
        }
        let _guard = RunGuard(Arc::clone(&self.running));

        let mut attempts = 0;
        loop {
            attempts += 1;
            let result = self.worker.do_work(token).await?;

            if result == WorkResult::Success {
                info!(attempts, "sync run succeeded");
                return Ok(RunReport { result, attempts });
            }
            if !self.policy.should_retry(attempts) {
                warn!(attempts, "sync run gave up after retries");
                return Ok(RunReport { result, attempts });
            }

            let delay = self.policy.delay_after(attempts);
            info!(attempts, delay_ms = delay.as_millis() as u64, "sync run will retry");
            tokio::select! {
                biased;
                _ = token.cancelled() => return Err(Cancelled.into()),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}
