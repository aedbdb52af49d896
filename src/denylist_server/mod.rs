//! HTTP server exposing the exit node deny list.
//!
//! Every request, whatever its method or path, gets the same response: the
//! current store contents rendered as nginx `deny` directives. The server
//! stops accepting connections when its cancellation token fires and lets
//! in-flight requests finish.

mod handler;

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::error_handling::RefreshStats;
use crate::storage::ExitNodeStore;

pub use handler::{deny_list_handler, render_deny_list};

/// Shared state for the deny list server
#[derive(Clone)]
pub struct DenylistState {
    pub store: Arc<ExitNodeStore>,
    pub stats: Arc<RefreshStats>,
}

impl DenylistState {
    pub fn new(store: Arc<ExitNodeStore>, stats: Arc<RefreshStats>) -> Self {
        Self { store, stats }
    }
}

/// Builds the single-route router.
pub fn denylist_router(state: DenylistState) -> Router {
    Router::new().fallback(deny_list_handler).with_state(state)
}

/// Binds the deny list listener.
pub async fn bind_denylist_listener(addr: &str) -> Result<TcpListener, anyhow::Error> {
    TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind deny list server to {}: {}", addr, e))
}

/// Serves the deny list on `listener` until `cancel` fires.
pub async fn serve_denylist(
    listener: TcpListener,
    state: DenylistState,
    cancel: CancellationToken,
) -> Result<(), anyhow::Error> {
    if let Ok(addr) = listener.local_addr() {
        log::info!("Deny list server listening on http://{}/", addr);
    }

    axum::serve(listener, denylist_router(state))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(|e| anyhow::anyhow!("Deny list server error: {}", e))?;

    Ok(())
}

/// Binds `addr` and serves the deny list until `cancel` fires.
pub async fn start_denylist_server(
    addr: &str,
    state: DenylistState,
    cancel: CancellationToken,
) -> Result<(), anyhow::Error> {
    let listener = bind_denylist_listener(addr).await?;
    serve_denylist(listener, state, cancel).await
}
