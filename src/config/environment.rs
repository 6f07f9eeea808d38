//! Environment-based configuration overrides

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use tracing::warn;

/// Environment configuration that can override file-based config
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub server_host: Option<String>,
    pub server_port: Option<u16>,
    pub pid_file: Option<PathBuf>,
    pub poll_interval_ms: Option<u64>,
}

impl EnvironmentConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            server_host: env::var("DRROUTE_HOST").ok().filter(|s| !s.trim().is_empty()),
            server_port: parse_var("PORT"),
            pid_file: env::var("PIDFILE")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            poll_interval_ms: parse_var("DRROUTE_POLL_INTERVAL_MS"),
        }
    }

    /// Check if any environment overrides are present
    pub fn has_overrides(&self) -> bool {
        self.server_host.is_some()
            || self.server_port.is_some()
            || self.pid_file.is_some()
            || self.poll_interval_ms.is_some()
    }

    /// Get a summary of active environment overrides
    pub fn override_summary(&self) -> Vec<String> {
        let mut overrides = Vec::new();

        if self.server_host.is_some() {
            overrides.push("DRROUTE_HOST".to_string());
        }
        if self.server_port.is_some() {
            overrides.push("PORT".to_string());
        }
        if self.pid_file.is_some() {
            overrides.push("PIDFILE".to_string());
        }
        if self.poll_interval_ms.is_some() {
            overrides.push("DRROUTE_POLL_INTERVAL_MS".to_string());
        }

        overrides
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(variable = name, value = %raw, "Ignoring invalid environment variable");
            None
        }
    }
}
