//! Database connection pool management.
//!
//! This module initializes and configures the SQLite connection pool with:
//! - WAL mode enabled for concurrent access
//! - A busy timeout so concurrent readers and the writer wait instead of failing
//! - Automatic storage directory and database file creation

use std::path::Path;

use log::{error, info};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::config::DB_BUSY_TIMEOUT;
use crate::error_handling::DatabaseError;

/// Initializes and returns a database connection pool for `db_path`.
///
/// Creates the parent directory and the database file if they don't exist.
///
/// # Errors
///
/// Returns `DatabaseError::FileCreationError` if the directory cannot be
/// created, or `DatabaseError::SqlError` if the connection fails.
pub async fn init_db_pool_with_path(
    db_path: &Path,
    max_connections: u32,
) -> Result<SqlitePool, DatabaseError> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                error!("Failed to create storage directory {}: {e}", parent.display());
                DatabaseError::FileCreationError(e.to_string())
            })?;
        }
    }

    if !db_path.exists() {
        info!("Creating database file {}", db_path.display());
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(DB_BUSY_TIMEOUT);

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .map_err(|e| {
            error!("Failed to connect to database: {e}");
            DatabaseError::SqlError(e)
        })
}
