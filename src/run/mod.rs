//! Service wiring: store, refresher, deny list server and status server.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{info, warn};
use tokio_util::sync::CancellationToken;

use crate::app::{shutdown_gracefully, shutdown_signal};
use crate::config::Config;
use crate::denylist_server::{bind_denylist_listener, serve_denylist, DenylistState};
use crate::error_handling::RefreshStats;
use crate::fetch::Fetcher;
use crate::initialization::init_client;
use crate::refresh::{Refresher, SourceSelector};
use crate::status_server::{start_status_server, StatusState};
use crate::storage::ExitNodeStore;

/// Runs the service until Ctrl-C or SIGTERM.
///
/// # Errors
///
/// Fails if the configuration is invalid, the store cannot be opened, the
/// HTTP client cannot be built or the listen address cannot be bound. Once
/// serving, refresh failures are logged and never end the service.
pub async fn run_service(config: Config) -> Result<()> {
    run_service_until(config, shutdown_signal()).await
}

/// Runs the service until `shutdown` resolves.
///
/// On shutdown the servers stop accepting connections, the refresher is
/// cancelled and awaited, and the store is closed.
pub async fn run_service_until<F>(config: Config, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    config.validate().context("Invalid configuration")?;

    let store = Arc::new(
        ExitNodeStore::open(&config.dir, config.store_mode)
            .await
            .with_context(|| format!("Failed to open store in {}", config.dir.display()))?,
    );

    let client = init_client(&config).context("Failed to initialize HTTP client")?;
    let stats = Arc::new(RefreshStats::new());
    let cancel = CancellationToken::new();

    let listener = match bind_denylist_listener(&config.addr).await {
        Ok(listener) => listener,
        Err(e) => {
            store.close().await;
            return Err(e);
        }
    };

    let refresher = Refresher::new(
        Fetcher::new(client),
        Arc::clone(&store),
        SourceSelector::from_config(&config),
        Duration::from_secs(config.refresh_interval_secs),
        Arc::clone(&stats),
    );
    let refresher_task = refresher.spawn(cancel.clone());

    let status_task = config.status_port.map(|port| {
        let state = StatusState::new(
            Arc::clone(&stats),
            Arc::clone(&store),
            config.source_policy,
        );
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = start_status_server(port, state, cancel).await {
                warn!("Status server error: {}", e);
            }
        })
    });

    let state = DenylistState::new(Arc::clone(&store), Arc::clone(&stats));
    let server = serve_denylist(listener, state, cancel.clone());
    tokio::pin!(server);
    tokio::pin!(shutdown);

    let result = tokio::select! {
        result = &mut server => result,
        _ = &mut shutdown => {
            info!("Shutting down");
            cancel.cancel();
            server.await
        }
    };

    shutdown_gracefully(cancel, Some(refresher_task), &store).await;
    if let Some(task) = status_task {
        let _ = task.await;
    }

    result
}
