//! The worker loop.
//!
//! One long-lived loop per process, started idempotently. It claims the
//! oldest eligible job, processes it fully and synchronously, then
//! looks for the next; when the queue is empty it sleeps for the poll
//! interval or until the submission layer wakes it.

use std::sync::{Arc, OnceLock};

use tokio::sync::{watch, Notify};
use tracing::{error, info};

use crate::processor::{run_claimed, ProcessingContext};

static RUNNER: OnceLock<RunnerHandle> = OnceLock::new();

/// Handle to the running loop: wake it early or shut it down.
#[derive(Clone)]
pub struct RunnerHandle {
    wake: Arc<Notify>,
    shutdown: Arc<watch::Sender<bool>>,
}

impl RunnerHandle {
    /// Ask the loop to poll now instead of waiting out the interval.
    /// Safe to call at any time; a wasted wake is a no-op.
    pub fn wake(&self) {
        self.wake.notify_one();
    }

    /// Ask the loop to stop after the in-flight job, if any.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(true);
    }
}

/// Single sequential job runner.
pub struct JobRunner {
    ctx: Arc<ProcessingContext>,
    wake: Arc<Notify>,
    shutdown: Arc<watch::Sender<bool>>,
}

impl JobRunner {
    pub fn new(ctx: Arc<ProcessingContext>) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            ctx,
            wake: Arc::new(Notify::new()),
            shutdown: Arc::new(shutdown),
        }
    }

    pub fn handle(&self) -> RunnerHandle {
        RunnerHandle {
            wake: Arc::clone(&self.wake),
            shutdown: Arc::clone(&self.shutdown),
        }
    }

    /// Run until shutdown. There is no cancellation of an in-flight job
    /// once claimed; shutdown takes effect between jobs.
    pub async fn run(self) {
        let mut shutdown_rx = self.shutdown.subscribe();
        info!(
            poll_interval = ?self.ctx.config.poll_interval,
            "Job runner started"
        );

        loop {
            if *shutdown_rx.borrow() {
                break;
            }

            match self.ctx.store.fetch_next_eligible().await {
                Ok(Some(job)) => {
                    run_claimed(&self.ctx, job).await;
                }
                Ok(None) => {
                    tokio::select! {
                        _ = tokio::time::sleep(self.ctx.config.poll_interval) => {}
                        _ = self.wake.notified() => {}
                        _ = shutdown_rx.changed() => {}
                    }
                }
                Err(e) => {
                    error!(error = %e, "Failed to poll job store");
                    tokio::select! {
                        _ = tokio::time::sleep(self.ctx.config.store_backoff) => {}
                        _ = shutdown_rx.changed() => {}
                    }
                }
            }
        }

        info!("Job runner stopped");
    }
}

/// Start the process-wide runner exactly once.
///
/// The first call spawns the loop and keeps its handle; every later
/// call is a no-op returning the same handle (its context argument is
/// ignored). Teardown is process exit or an explicit
/// [`RunnerHandle::shutdown`].
pub fn ensure_started(ctx: Arc<ProcessingContext>) -> RunnerHandle {
    RUNNER
        .get_or_init(|| {
            let runner = JobRunner::new(ctx);
            let handle = runner.handle();
            tokio::spawn(runner.run());
            handle
        })
        .clone()
}
