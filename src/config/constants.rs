//! Configuration constants.
//!
//! This module defines the upstream sources, timeouts, intervals and default
//! locations used throughout the application.

use std::time::Duration;

/// Structured "exit-addresses" listing published by the Tor Project.
///
/// Each relay block carries an `ExitAddress <ip> <date> <time>` line; the other
/// lines of the block contain no dotted quad and are skipped by the extractor.
pub const TOR_EXIT_ADDRESSES_URL: &str = "https://check.torproject.org/exit-addresses";

/// Bulk exit list: one address per line.
pub const TOR_BULK_EXIT_LIST_URL: &str = "https://check.torproject.org/torbulkexitlist";

/// Total timeout for one upstream fetch in seconds, connect through last body byte
pub const FETCH_TIMEOUT_SECS: u64 = 30;

/// Seconds between refresh passes
pub const REFRESH_INTERVAL_SECS: u64 = 5 * 60;

/// Default storage directory for the SQLite files
pub const DEFAULT_STORE_DIR: &str = "/tmp/tor_exit_denylist";

/// Database file name inside the storage directory
pub const DB_FILE_NAME: &str = "exit_nodes.db";

/// Default deny list listen address
pub const DEFAULT_LISTEN_ADDR: &str = "localhost:8091";

/// User-Agent sent with upstream fetches.
pub const DEFAULT_USER_AGENT: &str = concat!("tor_exit_denylist/", env!("CARGO_PKG_VERSION"));

/// Pattern an address must match to be extracted. Octet ranges are not checked.
pub const IP_PATTERN: &str = r"(\d+\.\d+\.\d+\.\d+)";

/// Comment line served in place of the deny list when the store cannot be read
pub const STORE_READ_ERROR_LINE: &str = "# some error has happened";

/// Busy timeout applied to every SQLite connection so concurrent readers and
/// the refresher wait on each other instead of failing with `SQLITE_BUSY`
pub const DB_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound on pooled SQLite connections in shared mode
pub const DB_MAX_CONNECTIONS: u32 = 8;
