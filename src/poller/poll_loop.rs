// src/poller/poll_loop.rs

use super::results::ResultsStore;
use crate::probe::Probe;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Lifecycle of a single poll loop task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Polling,
    Stopping,
    Stopped,
}

type ReleaseFn = Box<dyn FnOnce() + Send + Sync>;

/// Background task that probes one target at a fixed cadence until cancelled.
///
/// Cancellation is checked at the top of every iteration, before a probe is
/// issued. A probe that is already in flight is never interrupted; the sleep
/// between probes ends early once cancellation arrives. When the loop stops it
/// runs its release hook so the owner can accept a new run.
pub struct PollLoop {
    target: String,
    prober: Arc<dyn Probe>,
    results: Arc<ResultsStore>,
    interval: Duration,
    cancel: CancellationToken,
    release: Option<ReleaseFn>,
}

impl PollLoop {
    pub fn new(
        target: String,
        prober: Arc<dyn Probe>,
        results: Arc<ResultsStore>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            target,
            prober,
            results,
            interval,
            cancel,
            release: None,
        }
    }

    /// Hook invoked once, when the loop observes cancellation.
    pub fn on_release(mut self, release: impl FnOnce() + Send + Sync + 'static) -> Self {
        self.release = Some(Box::new(release));
        self
    }

    /// Drives the loop to completion and returns the number of finished probes.
    pub async fn run(mut self) -> u64 {
        let mut state = LoopState::Polling;
        let mut completed: u64 = 0;

        info!(endpoint = %self.target, "Poll loop started");

        loop {
            match state {
                LoopState::Polling => {
                    if self.cancel.is_cancelled() {
                        state = LoopState::Stopping;
                        continue;
                    }

                    let iteration = completed + 1;
                    debug!(iteration, endpoint = %self.target, "Poll [{}]...", iteration);
                    let status = self.prober.poll(&self.target).await;
                    self.results.record(iteration, &status);
                    completed = iteration;

                    tokio::select! {
                        () = self.cancel.cancelled() => {}
                        () = sleep(self.interval) => {}
                    }
                }
                LoopState::Stopping => {
                    info!(endpoint = %self.target, "Request to stop polling..");
                    if let Some(release) = self.release.take() {
                        release();
                    }
                    state = LoopState::Stopped;
                }
                LoopState::Stopped => break,
            }
        }

        info!(endpoint = %self.target, probes = completed, "Poll loop stopped");
        completed
    }
}
