// Shared test helpers for store setup and serving the deny list.

use std::net::SocketAddr;
use std::sync::Arc;

use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use tor_exit_denylist::denylist_server::serve_denylist;
use tor_exit_denylist::{DenylistState, ExitNodeStore, RefreshStats, StoreMode};

/// Opens a store in a fresh temporary directory.
/// The directory is removed when the returned `TempDir` is dropped.
#[allow(dead_code)] // Used by other test files
pub async fn open_temp_store(mode: StoreMode) -> (TempDir, Arc<ExitNodeStore>) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = ExitNodeStore::open(dir.path(), mode)
        .await
        .expect("Failed to open store");
    (dir, Arc::new(store))
}

#[allow(dead_code)]
pub fn ips(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

/// A deny list server bound to an ephemeral loopback port.
#[allow(dead_code)]
pub struct TestServer {
    pub base_url: String,
    pub cancel: CancellationToken,
    pub handle: JoinHandle<Result<(), anyhow::Error>>,
}

#[allow(dead_code)]
impl TestServer {
    pub async fn stop(self) {
        self.cancel.cancel();
        let _ = self.handle.await;
    }
}

#[allow(dead_code)]
pub async fn spawn_denylist(store: Arc<ExitNodeStore>, stats: Arc<RefreshStats>) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr: SocketAddr = listener.local_addr().expect("local addr");
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(serve_denylist(
        listener,
        DenylistState::new(store, stats),
        cancel.clone(),
    ));

    TestServer {
        base_url: format!("http://{addr}"),
        cancel,
        handle,
    }
}

/// Returns a loopback port that was free a moment ago.
#[allow(dead_code)]
pub async fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind probe listener");
    listener.local_addr().expect("local addr").port()
}
