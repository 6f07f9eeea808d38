//! Common test utilities and fixtures

#![allow(dead_code)]

use drroute::{config::AppConfig, run, AppState, Results, RunState};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// Test configuration builder
pub struct TestConfigBuilder {
    config: AppConfig,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    pub fn with_interval_ms(mut self, interval_ms: u64) -> Self {
        self.config.poller.interval_ms = interval_ms;
        self
    }

    pub fn with_connect_timeout_secs(mut self, secs: u64) -> Self {
        self.config.poller.tcp_connect_timeout_secs = secs;
        self
    }

    pub fn with_max_body_bytes(mut self, max: usize) -> Self {
        self.config.server.max_body_bytes = max;
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Router plus the state behind it.
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
}

impl TestApp {
    pub fn new(config: AppConfig) -> Self {
        let (router, state) = run(&config).expect("Failed to build test app");
        Self { router, state }
    }

    pub fn with_interval_ms(interval_ms: u64) -> Self {
        Self::new(TestConfigBuilder::new().with_interval_ms(interval_ms).build())
    }
}

/// Raw TCP server answering every connection with `response`.
///
/// Each request the server reads is forwarded on the returned channel.
pub async fn spawn_tcp_responder(response: &'static [u8]) -> (SocketAddr, mpsc::UnboundedReceiver<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind TCP responder");
    let addr = listener.local_addr().expect("Listener has no address");
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let tx = tx.clone();
            tokio::spawn(async move {
                let mut buf = vec![0u8; 1024];
                let n = socket.read(&mut buf).await.unwrap_or(0);
                let _ = tx.send(buf[..n].to_vec());
                let _ = socket.write_all(response).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (addr, rx)
}

/// An address nothing is listening on.
pub fn unused_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind probe port");
    let addr = listener.local_addr().expect("Listener has no address");
    drop(listener);
    addr
}

/// Polls `check` against the app's results until it holds or `timeout` passes.
pub async fn wait_for_results<F>(state: &AppState, timeout: Duration, check: F) -> Results
where
    F: Fn(&Results) -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let results = state.controller.health();
        if check(&results) || tokio::time::Instant::now() >= deadline {
            return results;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

/// Waits until the poll loop has released its slot.
pub async fn wait_for_idle(state: &AppState, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while state.controller.run_state() == RunState::Running {
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    true
}
