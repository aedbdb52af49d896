//! Status server data structures.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use crate::config::SourcePolicy;
use crate::error_handling::RefreshStats;
use crate::storage::ExitNodeStore;

/// Shared state for the status server
#[derive(Clone)]
pub struct StatusState {
    pub stats: Arc<RefreshStats>,
    pub store: Arc<ExitNodeStore>,
    pub source_policy: SourcePolicy,
    pub start_time: Arc<Instant>,
}

impl StatusState {
    pub fn new(
        stats: Arc<RefreshStats>,
        store: Arc<ExitNodeStore>,
        source_policy: SourcePolicy,
    ) -> Self {
        Self {
            stats,
            store,
            source_policy,
            start_time: Arc::new(Instant::now()),
        }
    }
}

/// JSON response for `/status` endpoint
#[derive(Serialize)]
pub struct StatusResponse {
    pub uptime_seconds: f64,
    pub source_policy: String,
    /// `None` when the store could not be read
    pub stored_addresses: Option<i64>,
    pub refresh: RefreshCounts,
    /// Failure counts keyed by metric label
    pub failures: BTreeMap<&'static str, usize>,
}

#[derive(Serialize)]
pub struct RefreshCounts {
    pub passes_started: usize,
    pub passes_succeeded: usize,
    pub passes_failed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_success_at: Option<i64>,
    pub last_extracted: usize,
    pub total_persisted: usize,
}
