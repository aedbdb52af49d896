//! Prometheus metrics handler.

use std::fmt::Write;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use strum::IntoEnumIterator;

use super::super::types::StatusState;
use crate::error_handling::FailureType;

/// Prometheus-compatible metrics endpoint
pub async fn metrics_handler(State(state): State<StatusState>) -> Response {
    let stats = &state.stats;
    // -1 signals that the store could not be read
    let stored = state.store.count().await.unwrap_or(-1);

    let mut metrics = format!(
        r#"# HELP tor_exit_denylist_stored_addresses Number of exit node addresses in the store
# TYPE tor_exit_denylist_stored_addresses gauge
tor_exit_denylist_stored_addresses {}

# HELP tor_exit_denylist_refresh_passes_total Refresh passes started
# TYPE tor_exit_denylist_refresh_passes_total counter
tor_exit_denylist_refresh_passes_total {}

# HELP tor_exit_denylist_refresh_successes_total Refresh passes that completed
# TYPE tor_exit_denylist_refresh_successes_total counter
tor_exit_denylist_refresh_successes_total {}

# HELP tor_exit_denylist_persisted_total Addresses written across all passes
# TYPE tor_exit_denylist_persisted_total counter
tor_exit_denylist_persisted_total {}

# HELP tor_exit_denylist_last_extracted Addresses extracted by the most recent pass
# TYPE tor_exit_denylist_last_extracted gauge
tor_exit_denylist_last_extracted {}

# HELP tor_exit_denylist_last_success_timestamp_seconds Unix time of the last successful pass
# TYPE tor_exit_denylist_last_success_timestamp_seconds gauge
tor_exit_denylist_last_success_timestamp_seconds {}

# HELP tor_exit_denylist_failures_total Failures by category
# TYPE tor_exit_denylist_failures_total counter
"#,
        stored,
        stats.passes_started(),
        stats.passes_succeeded(),
        stats.total_persisted(),
        stats.last_extracted(),
        stats.last_success_at().unwrap_or(0),
    );

    for failure in FailureType::iter() {
        let _ = writeln!(
            metrics,
            "tor_exit_denylist_failures_total{{type=\"{}\"}} {}",
            failure.metric_label(),
            stats.get_failure_count(failure)
        );
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4")],
        metrics,
    )
        .into_response()
}
