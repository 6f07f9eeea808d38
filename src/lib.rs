// src/lib.rs

pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod pid_file;
pub mod poller;
pub mod probe;
pub mod state;

use crate::handlers::{health_handler, method_not_allowed, start_handler, stop_handler};
use axum::{
    body::Body,
    http::{HeaderValue, Request as AxumRequest},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use std::{path::PathBuf, sync::Arc, time::Instant};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

// Re-exports of the key types
pub use config::AppConfig;
pub use error::{AppError, Result};
pub use poller::{PollController, Results, RunState};
pub use state::AppState;

/// Builds the control-plane router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/start", post(start_handler))
        .route("/stop", post(stop_handler))
        .route("/health", get(health_handler).head(method_not_allowed))
        .layer(RequestBodyLimitLayer::new(state.max_body_bytes))
        .with_state(state)
}

/// Middleware that tags every request with a request ID and traces it.
async fn trace_requests(
    mut req: AxumRequest<Body>,
    next: axum::middleware::Next,
) -> impl IntoResponse {
    let request_id = Uuid::new_v4();
    let start_time = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let span = info_span!(
        "request",
        request_id = %request_id,
        http.method = %method,
        url.path = %path,
    );

    req.extensions_mut().insert(request_id);

    async move {
        let mut response = error::REQUEST_ID.scope(request_id, next.run(req)).await;
        let elapsed = start_time.elapsed();

        if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
            response.headers_mut().insert("X-Request-ID", value);
        }

        info!(
            http.response.duration = ?elapsed,
            http.status_code = response.status().as_u16(),
            "Finished processing request"
        );

        response
    }
    .instrument(span)
    .await
}

/// Creates the application state and the fully layered router for `config`.
pub fn run(config: &AppConfig) -> Result<(Router, Arc<AppState>)> {
    info!("Starting dr. Route....");

    let state = Arc::new(AppState::new(config).map_err(|e| {
        error!(error = ?e, "Failed to initialize application state. Exiting.");
        e
    })?);
    info!("Application state initialized successfully.");

    let app = create_router(state.clone()).layer(axum::middleware::from_fn(trace_requests));

    Ok((app, state))
}

/// Loads, validates and logs the application configuration.
pub fn setup_configuration(config_path_override: Option<PathBuf>) -> Result<AppConfig> {
    let config_path = config_path_override.unwrap_or_else(|| {
        std::env::var("DRROUTE_CONFIG").map_or_else(|_| PathBuf::from("config.yaml"), PathBuf::from)
    });

    let config_path_display = config_path.display().to_string();
    if config_path.exists() {
        info!(config.path = %config_path_display, "Using configuration file");
    } else {
        info!(config.path = %config_path_display, "Optional configuration file not found. Using defaults and environment variables.");
    }

    let app_config = config::load_config(&config_path).map_err(|e| {
        error!(
            config.path = %config_path_display,
            error = ?e,
            "Failed to load or validate configuration. Exiting."
        );
        e
    })?;

    info!(
        server.host = %app_config.server.host,
        server.port = app_config.server.port,
        poll.interval_ms = app_config.poller.interval_ms,
        pid_file = ?app_config.pid_file,
        "Configuration loaded and validated successfully."
    );

    Ok(app_config)
}
