//! HTTP status server for monitoring the refresher.
//!
//! Provides two endpoints:
//! - `/metrics` - Prometheus-compatible metrics
//! - `/status` - JSON status endpoint with refresh statistics
//!
//! The server only binds to loopback and runs next to the deny list server.

mod handlers;
mod types;

use axum::routing::get;
use axum::Router;
use tokio_util::sync::CancellationToken;

use handlers::{metrics_handler, status_handler};
pub use types::{RefreshCounts, StatusResponse, StatusState};

/// Builds the status router.
pub fn status_router(state: StatusState) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/status", get(status_handler))
        .with_state(state)
}

/// Creates and starts the status server
pub async fn start_status_server(
    port: u16,
    state: StatusState,
    cancel: CancellationToken,
) -> Result<(), anyhow::Error> {
    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind status server to port {}: {}", port, e))?;

    log::info!("Status server listening on http://127.0.0.1:{}/", port);
    log::info!("  - Metrics: http://127.0.0.1:{}/metrics", port);
    log::info!("  - Status: http://127.0.0.1:{}/status", port);

    axum::serve(listener, status_router(state))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(|e| anyhow::anyhow!("Status server error: {}", e))?;

    Ok(())
}
