//! Graceful shutdown handling.

use std::time::Duration;

use log::{info, warn};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::storage::ExitNodeStore;

/// How long to wait for the refresher to notice cancellation.
const REFRESHER_STOP_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolves on Ctrl-C, or on SIGTERM where supported.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl-C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}

/// Stops background tasks and releases the store.
///
/// Cancels `cancel`, waits for the refresher to return, then closes the store.
pub async fn shutdown_gracefully(
    cancel: CancellationToken,
    refresher_task: Option<JoinHandle<()>>,
    store: &ExitNodeStore,
) {
    cancel.cancel();

    if let Some(task) = refresher_task {
        match tokio::time::timeout(REFRESHER_STOP_TIMEOUT, task).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Refresher task ended abnormally: {e}"),
            Err(_) => warn!(
                "Refresher did not stop within {}s",
                REFRESHER_STOP_TIMEOUT.as_secs()
            ),
        }
    }

    store.close().await;
}
