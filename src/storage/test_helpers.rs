//! Shared test helpers for storage tests.
//!
//! This module provides store setup used across the crate's unit tests.

#[cfg(test)]
use tempfile::TempDir;

#[cfg(test)]
use crate::config::StoreMode;
#[cfg(test)]
use crate::storage::ExitNodeStore;

/// Opens a store in a fresh temporary directory.
///
/// The directory is removed when the returned `TempDir` is dropped, so keep it
/// alive for as long as the store is used.
#[cfg(test)]
pub async fn create_test_store(mode: StoreMode) -> (TempDir, ExitNodeStore) {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let store = ExitNodeStore::open(dir.path(), mode)
        .await
        .expect("Failed to open test store");
    (dir, store)
}

/// Converts string literals into the owned addresses `upsert_all` takes.
#[cfg(test)]
pub fn ips(addresses: &[&str]) -> Vec<String> {
    addresses.iter().map(|s| s.to_string()).collect()
}
