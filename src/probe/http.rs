// src/probe/http.rs

use super::{Probe, INTERNAL_SERVER_ERROR};
use crate::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Probes `http://` targets with a GET and reports the response status.
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    /// Builds the shared client. Without a timeout the client default applies.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl Probe for HttpProber {
    async fn poll(&self, target: &str) -> String {
        match self.client.get(target).send().await {
            Ok(response) => {
                let status = response.status();
                // Releases the connection and whatever is left of the body.
                drop(response);
                debug!(endpoint = target, status = status.as_u16(), "HTTP probe completed");
                status.as_u16().to_string()
            }
            Err(e) => {
                warn!(endpoint = target, error = %e, "Error connecting to app");
                INTERNAL_SERVER_ERROR.to_string()
            }
        }
    }
}
