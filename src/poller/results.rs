// src/poller/results.rs

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Aggregate outcome of one poll run, as returned by `GET /health`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Results {
    #[serde(rename = "TotalRequests")]
    pub total_requests: u64,
    #[serde(rename = "Responses")]
    pub responses: HashMap<String, u64>,
}

impl Results {
    /// Sum of all histogram buckets. Equals `total_requests` for any run.
    pub fn response_count(&self) -> u64 {
        self.responses.values().sum()
    }

    pub fn count_for(&self, status: &str) -> u64 {
        self.responses.get(status).copied().unwrap_or(0)
    }
}

/// Results of one poll run, written by the poll loop and read by health queries.
#[derive(Debug, Default)]
pub struct ResultsStore {
    inner: RwLock<Results>,
}

impl ResultsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome of probe number `iteration` (counting from 1).
    pub fn record(&self, iteration: u64, status: &str) {
        let mut results = self.inner.write();
        *results.responses.entry(status.to_string()).or_insert(0) += 1;
        results.total_requests = iteration;
    }

    /// Copy of the current results.
    pub fn snapshot(&self) -> Results {
        self.inner.read().clone()
    }
}
