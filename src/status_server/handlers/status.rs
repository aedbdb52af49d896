//! JSON status handler.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use strum::IntoEnumIterator;

use super::super::types::{RefreshCounts, StatusResponse, StatusState};
use crate::error_handling::FailureType;

/// JSON status endpoint with refresh statistics and the stored address count
pub async fn status_handler(State(state): State<StatusState>) -> Response {
    let stats = &state.stats;

    let stored_addresses = match state.store.count().await {
        Ok(count) => Some(count),
        Err(e) => {
            log::warn!("Status: failed to count stored addresses: {e}");
            None
        }
    };

    let response = StatusResponse {
        uptime_seconds: state.start_time.elapsed().as_secs_f64(),
        source_policy: format!("{:?}", state.source_policy),
        stored_addresses,
        refresh: RefreshCounts {
            passes_started: stats.passes_started(),
            passes_succeeded: stats.passes_succeeded(),
            passes_failed: stats.total_failed_passes(),
            last_source: stats.last_source(),
            last_success_at: stats.last_success_at(),
            last_extracted: stats.last_extracted(),
            total_persisted: stats.total_persisted(),
        },
        failures: FailureType::iter()
            .map(|f| (f.metric_label(), stats.get_failure_count(f)))
            .collect(),
    };

    let json = match serde_json::to_string_pretty(&response) {
        Ok(json) => json,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to serialize status: {}", e),
            )
                .into_response();
        }
    };

    (StatusCode::OK, [("content-type", "application/json")], json).into_response()
}
