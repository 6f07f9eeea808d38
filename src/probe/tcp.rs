// src/probe/tcp.rs

use super::{Probe, INTERNAL_SERVER_ERROR};
use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Probes bare `host:port` targets with a hand-written HTTP/1.1 request and
/// reads the status code off the first response line.
#[derive(Debug, Clone)]
pub struct TcpProber {
    connect_timeout: Duration,
    read_buffer: usize,
}

impl TcpProber {
    pub fn new(connect_timeout: Duration, read_buffer: usize) -> Self {
        Self {
            connect_timeout,
            read_buffer,
        }
    }
}

impl Default for TcpProber {
    fn default() -> Self {
        Self::new(Duration::from_secs(5), 1024)
    }
}

/// The exact bytes written to the target on every TCP probe.
pub fn health_request(target: &str) -> String {
    format!("GET /health HTTP/1.1\r\nHost: {target}\r\n\r\n")
}

/// Second space-separated token of the response, if there is one.
///
/// The response is split on single spaces, so `"HTTP/1.1 204 No Content"`
/// yields `"204"`. Anything with fewer than two tokens yields `None`.
pub fn parse_status_code(response: &str) -> Option<&str> {
    let mut parts = response.split(' ');
    parts.next()?;
    parts.next()
}

#[async_trait]
impl Probe for TcpProber {
    async fn poll(&self, target: &str) -> String {
        let mut stream = match timeout(self.connect_timeout, TcpStream::connect(target)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                warn!(endpoint = target, error = %e, "Error connecting to app");
                return INTERNAL_SERVER_ERROR.to_string();
            }
            Err(_) => {
                warn!(
                    endpoint = target,
                    timeout_secs = self.connect_timeout.as_secs_f64(),
                    "Timed out connecting to app"
                );
                return INTERNAL_SERVER_ERROR.to_string();
            }
        };

        if let Err(e) = stream.write_all(health_request(target).as_bytes()).await {
            warn!(endpoint = target, error = %e, "Error writing HTTP req");
            return INTERNAL_SERVER_ERROR.to_string();
        }

        let mut buf = vec![0u8; self.read_buffer];
        let n = match stream.read(&mut buf).await {
            Ok(0) => {
                warn!(endpoint = target, "Error reading HTTP response: connection closed without data");
                return INTERNAL_SERVER_ERROR.to_string();
            }
            Ok(n) => n,
            Err(e) => {
                warn!(endpoint = target, error = %e, "Error reading HTTP response");
                return INTERNAL_SERVER_ERROR.to_string();
            }
        };

        let body = String::from_utf8_lossy(&buf[..n]);
        debug!(endpoint = target, body = %body, "TCP probe response");

        match parse_status_code(&body) {
            Some(status) => {
                debug!(endpoint = target, status, "TCP probe completed");
                status.to_string()
            }
            None => {
                warn!(endpoint = target, "Response has no status code");
                INTERNAL_SERVER_ERROR.to_string()
            }
        }
    }
}
