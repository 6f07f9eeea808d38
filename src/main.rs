// src/main.rs

use axum::serve;
use drroute::{
    cli::Cli,
    config::ConfigValidator,
    pid_file::PidFileGuard,
    run, setup_configuration, AppError,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!(signal = "Ctrl+C", "Received signal. Initiating graceful shutdown...") },
        () = terminate => { info!(signal = "Terminate", "Received signal. Initiating graceful shutdown...") },
    }
}

fn init_tracing(cli: &Cli) {
    let env_filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_current_span(true).with_span_list(true))
            .init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse_args();
    init_tracing(&cli);

    let mut config = setup_configuration(cli.config.clone())?;
    cli.apply_to(&mut config);
    ConfigValidator::validate(&config)?;

    let (app, state) = run(&config)?;

    let pid_file = config
        .pid_file
        .as_deref()
        .map(PidFileGuard::create)
        .transpose()
        .map_err(|e| {
            error!(error = %e, "Error writing pidfile. Exiting.");
            e
        })?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| {
            AppError::config_validation(format!("Invalid bind address: {e}"), Some("server.host"))
        })?;
    let listener = TcpListener::bind(addr).await.map_err(|e| {
        error!(server.address = %addr, error = ?e, "Failed to bind to address. Exiting.");
        AppError::from(e)
    })?;
    info!(server.address = %addr, "Doctor route running...");

    let served = serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await;

    state.controller.shutdown().await;
    if let Some(pid_file) = pid_file {
        info!(pid_file = %pid_file.path().display(), "Removing pid file");
        drop(pid_file);
    }

    served.map_err(|e| {
        error!(error = ?e, "Server run loop encountered an error. Exiting.");
        AppError::from(e)
    })?;

    info!("Server shut down gracefully.");
    Ok(())
}
