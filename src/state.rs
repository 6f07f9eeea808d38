// src/state.rs

use crate::config::AppConfig;
use crate::error::Result;
use crate::poller::PollController;
use tracing::info;

/// Represents the shared application state that is accessible by all Axum handlers.
#[derive(Debug)]
pub struct AppState {
    pub controller: PollController,
    pub max_body_bytes: usize,
}

impl AppState {
    /// Creates a new `AppState`, building the probe clients from the poller config.
    pub fn new(config: &AppConfig) -> Result<Self> {
        info!(
            poll.interval_ms = config.poller.interval_ms,
            poll.tcp_connect_timeout_secs = config.poller.tcp_connect_timeout_secs,
            poll.http_timeout_secs = ?config.poller.http_timeout_secs,
            "Creating shared AppState: initializing poll controller..."
        );

        Ok(Self {
            controller: PollController::from_config(&config.poller)?,
            max_body_bytes: config.server.max_body_bytes,
        })
    }
}
