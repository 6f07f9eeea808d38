// src/probe/mod.rs

//! Liveness probers.
//!
//! A prober performs exactly one check against a target and reports the
//! observed status code as a string. Probers never fail: connection errors,
//! timeouts and unparseable responses are logged and reported as
//! [`INTERNAL_SERVER_ERROR`], so the poll loop can count them like any other
//! outcome.

pub mod http;
pub mod tcp;

use crate::config::PollerConfig;
use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

pub use http::HttpProber;
pub use tcp::TcpProber;

/// Status recorded for every probe that could not produce a real status code.
pub const INTERNAL_SERVER_ERROR: &str = "500";

/// Scheme marker that selects HTTP probing. Anything else is probed over raw TCP.
pub const HTTP_SCHEME: &str = "http://";

/// One liveness check against a target.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn poll(&self, target: &str) -> String;
}

/// Probing protocol, chosen once per run from the target address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Http,
    Tcp,
}

impl Protocol {
    /// `http://` targets are probed with an HTTP client, everything else
    /// (typically `host:port`) over a plain TCP socket.
    pub fn classify(target: &str) -> Self {
        if target.starts_with(HTTP_SCHEME) {
            Self::Http
        } else {
            Self::Tcp
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => write!(f, "http"),
            Self::Tcp => write!(f, "tcp"),
        }
    }
}

/// A prober bound to one protocol.
#[derive(Debug, Clone)]
pub enum Prober {
    Http(HttpProber),
    Tcp(TcpProber),
}

impl Prober {
    pub fn protocol(&self) -> Protocol {
        match self {
            Self::Http(_) => Protocol::Http,
            Self::Tcp(_) => Protocol::Tcp,
        }
    }
}

#[async_trait]
impl Probe for Prober {
    async fn poll(&self, target: &str) -> String {
        match self {
            Self::Http(prober) => prober.poll(target).await,
            Self::Tcp(prober) => prober.poll(target).await,
        }
    }
}

/// Pre-built probers for both protocols. The HTTP client is created once and
/// shared by every run.
#[derive(Debug, Clone)]
pub struct ProberSet {
    http: HttpProber,
    tcp: TcpProber,
}

impl ProberSet {
    pub fn from_config(config: &PollerConfig) -> Result<Self> {
        Ok(Self {
            http: HttpProber::new(config.http_timeout())?,
            tcp: TcpProber::new(config.tcp_connect_timeout(), config.tcp_read_buffer_bytes),
        })
    }

    pub fn select(&self, protocol: Protocol) -> Prober {
        match protocol {
            Protocol::Http => Prober::Http(self.http.clone()),
            Protocol::Tcp => Prober::Tcp(self.tcp.clone()),
        }
    }
}
