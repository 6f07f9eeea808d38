// src/config/loader.rs

use crate::config::{AppConfig, ConfigValidator, EnvironmentConfig};
use crate::error::{AppError, Result};
use std::path::Path;
use tracing::{debug, info};

/// Load configuration from file or defaults, then apply environment overrides
pub fn load_config(config_path: &Path) -> Result<AppConfig> {
    let mut config = if config_path.exists() {
        info!("Loading configuration from file: {}", config_path.display());
        load_from_file(config_path)?
    } else {
        info!("Configuration file not found, using defaults");
        AppConfig::default()
    };

    let env = EnvironmentConfig::from_env();
    if env.has_overrides() {
        info!(
            variables = ?env.override_summary(),
            "Applying environment overrides"
        );
        apply_env_overrides(&mut config, &env);
    }

    ConfigValidator::validate(&config)?;

    debug!("Configuration loaded and validated successfully");
    Ok(config)
}

fn load_from_file(config_path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(config_path).map_err(|_| AppError::ConfigNotFound {
        path: config_path.display().to_string(),
    })?;

    serde_yaml::from_str(&content).map_err(|e| AppError::ConfigParse {
        message: format!("Failed to parse config file: {e}"),
        line: e.location().map(|loc| loc.line()),
    })
}

/// Apply environment overrides on top of a loaded configuration
pub fn apply_env_overrides(config: &mut AppConfig, env: &EnvironmentConfig) {
    if let Some(host) = &env.server_host {
        info!("Overriding server host from environment variable: {}", host);
        config.server.host = host.clone();
    }

    if let Some(port) = env.server_port {
        info!("Overriding server port from environment variable: {}", port);
        config.server.port = port;
    }

    if let Some(pid_file) = &env.pid_file {
        info!("Overriding pid file from environment variable: {}", pid_file.display());
        config.pid_file = Some(pid_file.clone());
    }

    if let Some(interval_ms) = env.poll_interval_ms {
        info!("Overriding poll interval from environment variable: {}ms", interval_ms);
        config.poller.interval_ms = interval_ms;
    }
}
