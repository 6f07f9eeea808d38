// src/poller/mod.rs

//! Poll lifecycle control.
//!
//! [`PollController`] owns the single optional poll run of the process. A run
//! is represented by an [`ActiveRun`] slot holding its cancellation token; the
//! slot is filled by [`PollController::start`] and cleared by the poll loop
//! itself once it has observed cancellation. While the slot is occupied every
//! further start is rejected, including the short window between a stop and
//! the loop actually winding down.

pub mod poll_loop;
pub mod results;

use crate::config::PollerConfig;
use crate::error::{AppError, Result};
use crate::probe::{Probe, ProberSet, Protocol};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

pub use poll_loop::{LoopState, PollLoop};
pub use results::{Results, ResultsStore};

/// Whether a poll loop is currently alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunState {
    Idle,
    Running,
}

/// Description of the run occupying the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunInfo {
    pub id: u64,
    pub target: String,
    pub protocol: Protocol,
}

#[derive(Debug)]
struct ActiveRun {
    info: RunInfo,
    cancel: CancellationToken,
}

#[derive(Debug)]
struct Inner {
    active: Mutex<Option<ActiveRun>>,
    results: RwLock<Arc<ResultsStore>>,
    task: Mutex<Option<JoinHandle<u64>>>,
    next_run_id: AtomicU64,
    probers: ProberSet,
    interval: Duration,
}

/// Start/stop/health coordination for the background poll loop.
#[derive(Debug, Clone)]
pub struct PollController {
    inner: Arc<Inner>,
}

impl PollController {
    pub fn new(probers: ProberSet, interval: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                active: Mutex::new(None),
                results: RwLock::new(Arc::new(ResultsStore::new())),
                task: Mutex::new(None),
                next_run_id: AtomicU64::new(0),
                probers,
                interval,
            }),
        }
    }

    pub fn from_config(config: &PollerConfig) -> Result<Self> {
        Ok(Self::new(ProberSet::from_config(config)?, config.interval()))
    }

    /// Starts polling `endpoint`, or `request_host` when no endpoint is given.
    ///
    /// The protocol is picked from the resolved target and stays fixed for the
    /// whole run. Returns as soon as the loop is spawned.
    pub fn start(&self, endpoint: Option<&str>, request_host: &str) -> Result<RunInfo> {
        let target = resolve_target(endpoint, request_host);
        if target.is_empty() {
            return Err(AppError::invalid_request(
                "No endpoint given and the request has no host",
            ));
        }

        let protocol = Protocol::classify(&target);
        let prober = Arc::new(self.inner.probers.select(protocol));
        self.start_with(target, protocol, prober)
    }

    /// Starts a run with an explicit prober.
    pub fn start_with(
        &self,
        target: String,
        protocol: Protocol,
        prober: Arc<dyn Probe>,
    ) -> Result<RunInfo> {
        let mut active = self.inner.active.lock();
        if let Some(run) = active.as_ref() {
            warn!(
                run_id = run.info.id,
                endpoint = %run.info.target,
                "Start rejected: poller already running"
            );
            return Err(AppError::AlreadyRunning);
        }

        let info = RunInfo {
            id: self.inner.next_run_id.fetch_add(1, Ordering::Relaxed) + 1,
            target,
            protocol,
        };
        let cancel = CancellationToken::new();
        let results = Arc::new(ResultsStore::new());
        *self.inner.results.write() = Arc::clone(&results);

        let run_id = info.id;
        let weak = Arc::downgrade(&self.inner);
        let poll_loop = PollLoop::new(
            info.target.clone(),
            prober,
            results,
            self.inner.interval,
            cancel.clone(),
        )
        .on_release(move || {
            if let Some(inner) = weak.upgrade() {
                let mut active = inner.active.lock();
                if active.as_ref().map(|run| run.info.id) == Some(run_id) {
                    *active = None;
                }
            }
        });

        info!(
            run_id,
            endpoint = %info.target,
            protocol = %info.protocol,
            "Endpoint to poll"
        );

        *active = Some(ActiveRun {
            info: info.clone(),
            cancel,
        });
        let handle = tokio::spawn(poll_loop.run());
        *self.inner.task.lock() = Some(handle);

        Ok(info)
    }

    /// Asks the active loop to stop. Returns `true` if a notification was
    /// delivered; stopping an idle or already-stopping poller does nothing.
    pub fn stop(&self) -> bool {
        let active = self.inner.active.lock();
        match active.as_ref() {
            Some(run) if !run.cancel.is_cancelled() => {
                info!(run_id = run.info.id, endpoint = %run.info.target, "Stopping...");
                run.cancel.cancel();
                true
            }
            _ => false,
        }
    }

    /// Copy of the latest run's results. Empty before the first start.
    pub fn health(&self) -> Results {
        self.inner.results.read().snapshot()
    }

    pub fn run_state(&self) -> RunState {
        if self.inner.active.lock().is_some() {
            RunState::Running
        } else {
            RunState::Idle
        }
    }

    pub fn active_run(&self) -> Option<RunInfo> {
        self.inner.active.lock().as_ref().map(|run| run.info.clone())
    }

    /// Stops the active loop and waits for it to exit.
    pub async fn shutdown(&self) {
        self.stop();

        let handle = self.inner.task.lock().take();
        if let Some(handle) = handle {
            match handle.await {
                Ok(probes) => info!(probes, "Poll loop finished"),
                Err(e) => error!(error = %e, "Poll loop task failed"),
            }
        }
    }
}

fn resolve_target(endpoint: Option<&str>, request_host: &str) -> String {
    match endpoint {
        Some(endpoint) if !endpoint.is_empty() => endpoint.to_string(),
        _ => request_host.to_string(),
    }
}
