// src/config/validation.rs

use crate::config::AppConfig;
use crate::error::{AppError, Result};
use tracing::{debug, warn};

const MAX_TCP_READ_BUFFER: usize = 64 * 1024;

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &AppConfig) -> Result<()> {
        debug!("Starting configuration validation");

        if let Err(e) = Self::validate_server_config(config) {
            warn!("Server config validation failed: {}", e);
            return Err(e);
        }
        debug!("Server config validation passed");

        if let Err(e) = Self::validate_poller_config(config) {
            warn!("Poller config validation failed: {}", e);
            return Err(e);
        }
        debug!("Poller config validation passed");

        if let Some(pid_file) = &config.pid_file {
            if pid_file.as_os_str().is_empty() {
                return Err(AppError::config_validation(
                    "pid_file must not be empty when set",
                    Some("pid_file"),
                ));
            }
        }

        debug!("Configuration validation completed successfully");
        Ok(())
    }

    fn validate_server_config(config: &AppConfig) -> Result<()> {
        if config.server.port == 0 {
            return Err(AppError::config_validation(
                "Server port cannot be 0",
                Some("server.port"),
            ));
        }

        if config.server.host.trim().is_empty() {
            return Err(AppError::config_validation(
                "Server host cannot be empty",
                Some("server.host"),
            ));
        }

        if config.server.max_body_bytes == 0 {
            return Err(AppError::config_validation(
                "max_body_bytes must be greater than 0",
                Some("server.max_body_bytes"),
            ));
        }

        Ok(())
    }

    fn validate_poller_config(config: &AppConfig) -> Result<()> {
        let poller = &config.poller;

        if poller.interval_ms == 0 {
            return Err(AppError::config_validation(
                "Poll interval must be greater than 0",
                Some("poller.interval_ms"),
            ));
        }

        if poller.tcp_connect_timeout_secs == 0 {
            return Err(AppError::config_validation(
                "TCP connect timeout must be greater than 0",
                Some("poller.tcp_connect_timeout_secs"),
            ));
        }

        if poller.tcp_read_buffer_bytes == 0 || poller.tcp_read_buffer_bytes > MAX_TCP_READ_BUFFER {
            return Err(AppError::config_validation(
                format!("TCP read buffer must be between 1 and {MAX_TCP_READ_BUFFER} bytes"),
                Some("poller.tcp_read_buffer_bytes"),
            ));
        }

        if poller.http_timeout_secs == Some(0) {
            return Err(AppError::config_validation(
                "HTTP timeout must be greater than 0 when set",
                Some("poller.http_timeout_secs"),
            ));
        }

        Ok(())
    }
}
