//! tor_exit_denylist: serves known Tor exit node addresses as nginx `deny`
//! directives.
//!
//! A background refresher periodically downloads one of the public Tor exit
//! lists, extracts every IPv4 address from it and records the time it was
//! last seen in a SQLite store. An HTTP server answers every request with the
//! stored addresses, one `deny <ip>;` line each, ready to be included by nginx.
//!
//! # Example
//!
//! ```no_run
//! use tor_exit_denylist::{run_service, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = Config {
//!     dir: std::path::PathBuf::from("/var/lib/tor_exit_denylist"),
//!     ..Default::default()
//! };
//! run_service(config).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime.

mod app;
pub mod config;
pub mod denylist_server;
pub mod error_handling;
pub mod extract;
pub mod fetch;
pub mod initialization;
pub mod refresh;
mod run;
pub mod status_server;
pub mod storage;

pub use app::{shutdown_gracefully, shutdown_signal};
pub use config::{Config, LogFormat, LogLevel, SourcePolicy, StoreMode};
pub use denylist_server::{denylist_router, render_deny_list, DenylistState};
pub use error_handling::{
    DatabaseError, FailureType, FetchError, InitializationError, RefreshError, RefreshStats,
};
pub use fetch::Fetcher;
pub use refresh::{PassReport, Refresher, SourceSelector};
pub use run::{run_service, run_service_until};
pub use storage::ExitNodeStore;
