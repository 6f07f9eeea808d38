// src/config/app.rs

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, PartialEq, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Upper bound for control request bodies.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

/// Tunables for the background poll loop and its probers.
#[derive(Debug, Deserialize, Clone, PartialEq, Serialize)]
pub struct PollerConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_tcp_connect_timeout")]
    pub tcp_connect_timeout_secs: u64,
    #[serde(default = "default_tcp_read_buffer")]
    pub tcp_read_buffer_bytes: usize,
    /// Total timeout for HTTP probes. `None` keeps the client default.
    #[serde(default)]
    pub http_timeout_secs: Option<u64>,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            tcp_connect_timeout_secs: default_tcp_connect_timeout(),
            tcp_read_buffer_bytes: default_tcp_read_buffer(),
            http_timeout_secs: None,
        }
    }
}

impl PollerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn tcp_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.tcp_connect_timeout_secs)
    }

    pub fn http_timeout(&self) -> Option<Duration> {
        self.http_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Default, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub poller: PollerConfig,
    #[serde(default)]
    pub pid_file: Option<PathBuf>,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_tcp_connect_timeout() -> u64 {
    5
}

fn default_tcp_read_buffer() -> usize {
    1024
}
