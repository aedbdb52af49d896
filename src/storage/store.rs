//! Exit node address store.
//!
//! Maps an address string to the Unix timestamp of its latest observation.
//! Every key is written in its own transaction: a batch is not atomic, but
//! each address is either fully written or untouched. Concurrent access is
//! left to SQLite (WAL journal plus busy timeout); the store adds no locks.

use std::path::{Path, PathBuf};

use futures::TryStreamExt;
use log::{debug, error, info};
use sqlx::SqlitePool;

use crate::config::{StoreMode, DB_FILE_NAME, DB_MAX_CONNECTIONS};
use crate::error_handling::DatabaseError;
use crate::storage::migrations::run_migrations;
use crate::storage::pool::init_db_pool_with_path;

const UPSERT_SQL: &str = "INSERT INTO exit_nodes (ip, last_seen) VALUES (?, ?)
     ON CONFLICT(ip) DO UPDATE SET last_seen = excluded.last_seen";

/// Durable address store shared by the refresher and the deny list handler.
///
/// In [`StoreMode::Shared`] one pool is opened up front and reused; in
/// [`StoreMode::PerOperation`] every operation opens a single-connection pool
/// and closes it before returning.
pub struct ExitNodeStore {
    db_path: PathBuf,
    shared: Option<SqlitePool>,
}

impl ExitNodeStore {
    /// Opens (creating if needed) the store under `dir` and applies migrations.
    ///
    /// # Errors
    ///
    /// Returns a `DatabaseError` if the directory, database file, connection
    /// or schema cannot be set up.
    pub async fn open(dir: &Path, mode: StoreMode) -> Result<Self, DatabaseError> {
        let db_path = dir.join(DB_FILE_NAME);
        let pool = init_db_pool_with_path(&db_path, DB_MAX_CONNECTIONS).await?;
        run_migrations(&pool).await?;

        info!("Opened exit node store at {} ({:?})", db_path.display(), mode);

        let shared = match mode {
            StoreMode::Shared => Some(pool),
            StoreMode::PerOperation => {
                pool.close().await;
                None
            }
        };

        Ok(Self { db_path, shared })
    }

    /// Path of the SQLite database file.
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn mode(&self) -> StoreMode {
        if self.shared.is_some() {
            StoreMode::Shared
        } else {
            StoreMode::PerOperation
        }
    }

    /// Writes `timestamp` for every address in `ips`, inserting or overwriting.
    ///
    /// Stops at the first failing write and returns its error; addresses
    /// written before it stay written. Returns the number of addresses written.
    pub async fn upsert_all(&self, ips: &[String], timestamp: i64) -> Result<usize, DatabaseError> {
        let pool = self.checkout().await?;
        let result = upsert_each(&pool, ips, timestamp).await;
        self.checkin(pool).await;

        match &result {
            Ok(written) => debug!("Saved {written} addresses to the store"),
            Err(e) => error!("Error when writing to the store: {e}"),
        }
        result
    }

    /// Returns every stored address in the engine's iteration order.
    pub async fn list_keys(&self) -> Result<Vec<String>, DatabaseError> {
        let pool = self.checkout().await?;
        let result = sqlx::query_scalar::<_, String>("SELECT ip FROM exit_nodes")
            .fetch(&pool)
            .try_collect::<Vec<String>>()
            .await
            .map_err(DatabaseError::from);
        self.checkin(pool).await;

        if let Ok(keys) = &result {
            debug!("Read {} addresses from the store", keys.len());
        }
        result
    }

    /// Timestamp of the latest observation of `ip`, if it is stored.
    pub async fn last_seen(&self, ip: &str) -> Result<Option<i64>, DatabaseError> {
        let pool = self.checkout().await?;
        let result =
            sqlx::query_scalar::<_, i64>("SELECT last_seen FROM exit_nodes WHERE ip = ?")
                .bind(ip)
                .fetch_optional(&pool)
                .await
                .map_err(DatabaseError::from);
        self.checkin(pool).await;
        result
    }

    /// Number of stored addresses.
    pub async fn count(&self) -> Result<i64, DatabaseError> {
        let pool = self.checkout().await?;
        let result = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM exit_nodes")
            .fetch_one(&pool)
            .await
            .map_err(DatabaseError::from);
        self.checkin(pool).await;
        result
    }

    /// Closes the shared pool, waiting for checked-out connections to return.
    pub async fn close(&self) {
        if let Some(pool) = &self.shared {
            pool.close().await;
            info!("Closed exit node store at {}", self.db_path.display());
        }
    }

    async fn checkout(&self) -> Result<SqlitePool, DatabaseError> {
        match &self.shared {
            Some(pool) => Ok(pool.clone()),
            None => init_db_pool_with_path(&self.db_path, 1).await,
        }
    }

    async fn checkin(&self, pool: SqlitePool) {
        if self.shared.is_none() {
            pool.close().await;
        }
    }
}

async fn upsert_each(
    pool: &SqlitePool,
    ips: &[String],
    timestamp: i64,
) -> Result<usize, DatabaseError> {
    for (written, ip) in ips.iter().enumerate() {
        if let Err(e) = upsert_one(pool, ip, timestamp).await {
            error!("Failed to save {ip} after {written} addresses: {e}");
            return Err(e);
        }
    }
    Ok(ips.len())
}

async fn upsert_one(pool: &SqlitePool, ip: &str, timestamp: i64) -> Result<(), DatabaseError> {
    // Dropping the transaction on an early return rolls it back
    let mut tx = pool.begin().await?;
    sqlx::query(UPSERT_SQL)
        .bind(ip)
        .bind(timestamp)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_helpers::{create_test_store, ips};

    #[tokio::test]
    async fn test_upsert_then_list() {
        let (_dir, store) = create_test_store(StoreMode::Shared).await;
        let written = store
            .upsert_all(&ips(&["1.2.3.4", "5.6.7.8"]), 100)
            .await
            .expect("upsert should succeed");
        assert_eq!(written, 2);

        let mut keys = store.list_keys().await.expect("list should succeed");
        keys.sort();
        assert_eq!(keys, ips(&["1.2.3.4", "5.6.7.8"]));
    }

    #[tokio::test]
    async fn test_upsert_overwrites_timestamp() {
        let (_dir, store) = create_test_store(StoreMode::Shared).await;
        store.upsert_all(&ips(&["1.2.3.4"]), 100).await.unwrap();
        store.upsert_all(&ips(&["1.2.3.4"]), 200).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(store.last_seen("1.2.3.4").await.unwrap(), Some(200));
    }

    #[tokio::test]
    async fn test_duplicate_in_same_batch_keeps_one_record() {
        let (_dir, store) = create_test_store(StoreMode::Shared).await;
        let written = store
            .upsert_all(&ips(&["1.2.3.4", "1.2.3.4"]), 100)
            .await
            .unwrap();
        assert_eq!(written, 2);
        assert_eq!(store.list_keys().await.unwrap(), ips(&["1.2.3.4"]));
    }

    #[tokio::test]
    async fn test_last_seen_missing_key() {
        let (_dir, store) = create_test_store(StoreMode::Shared).await;
        assert_eq!(store.last_seen("10.0.0.1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_empty_store_lists_nothing() {
        let (_dir, store) = create_test_store(StoreMode::Shared).await;
        assert!(store.list_keys().await.unwrap().is_empty());
        assert_eq!(store.upsert_all(&[], 100).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_batch_stops_at_first_failed_write() {
        let (_dir, store) = create_test_store(StoreMode::Shared).await;
        let pool = store.shared.as_ref().expect("shared mode has a pool");
        sqlx::query(
            "CREATE TRIGGER reject_address BEFORE INSERT ON exit_nodes
             WHEN NEW.ip = '6.6.6.6'
             BEGIN SELECT RAISE(ABORT, 'rejected'); END",
        )
        .execute(pool)
        .await
        .expect("trigger should be created");

        let result = store
            .upsert_all(&ips(&["1.1.1.1", "6.6.6.6", "2.2.2.2"]), 100)
            .await;
        assert!(result.is_err());

        // Written before the failure: kept. After it: never attempted.
        assert_eq!(store.list_keys().await.unwrap(), ips(&["1.1.1.1"]));
    }

    #[tokio::test]
    async fn test_per_operation_mode_round_trip() {
        let (_dir, store) = create_test_store(StoreMode::PerOperation).await;
        assert_eq!(store.mode(), StoreMode::PerOperation);

        store.upsert_all(&ips(&["9.9.9.9"]), 1).await.unwrap();
        store.upsert_all(&ips(&["9.9.9.9"]), 2).await.unwrap();

        assert_eq!(store.list_keys().await.unwrap(), ips(&["9.9.9.9"]));
        assert_eq!(store.last_seen("9.9.9.9").await.unwrap(), Some(2));
        store.close().await;
    }

    #[tokio::test]
    async fn test_open_creates_missing_directory() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let nested = dir.path().join("a").join("b");
        let store = ExitNodeStore::open(&nested, StoreMode::Shared)
            .await
            .expect("open should create parent directories");
        assert!(store.db_path().exists());
        store.close().await;
    }
}
