//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    DEFAULT_LISTEN_ADDR, DEFAULT_STORE_DIR, FETCH_TIMEOUT_SECS, REFRESH_INTERVAL_SECS,
    TOR_BULK_EXIT_LIST_URL, TOR_EXIT_ADDRESSES_URL,
};
use crate::error_handling::InitializationError;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Which upstream list each refresh pass fetches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SourcePolicy {
    /// Round-robin over both sources, starting with the exit-addresses listing
    Alternate,
    /// Pick one source at random at startup and keep it
    Random,
    /// Always fetch the exit-addresses listing
    ExitAddresses,
    /// Always fetch the bulk exit list
    BulkExitList,
}

/// How long a store handle lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StoreMode {
    /// Open the database once and share the pool (default)
    Shared,
    /// Open and close the database around every operation
    PerOperation,
}

/// Service configuration.
///
/// Parsed from the command line by the binary; library users can build it
/// programmatically starting from `Config::default()`.
///
/// # Examples
///
/// ```no_run
/// use tor_exit_denylist::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     dir: PathBuf::from("/var/lib/tor_exit_denylist"),
///     addr: "127.0.0.1:8091".to_string(),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "tor_exit_denylist",
    about = "Serves known Tor exit node addresses as nginx deny directives.",
    version
)]
pub struct Config {
    /// Directory holding the SQLite database
    #[arg(long, env = "TOR_EXIT_DENYLIST_DIR", default_value = DEFAULT_STORE_DIR)]
    pub dir: PathBuf,

    /// TCP address the deny list is served on
    #[arg(long, env = "TOR_EXIT_DENYLIST_ADDR", default_value = DEFAULT_LISTEN_ADDR)]
    pub addr: String,

    /// Source selection across refresh passes
    #[arg(long, value_enum, default_value_t = SourcePolicy::Alternate)]
    pub source_policy: SourcePolicy,

    /// URL of the structured exit-addresses listing
    #[arg(long, default_value = TOR_EXIT_ADDRESSES_URL)]
    pub exit_addresses_url: String,

    /// URL of the bulk exit list
    #[arg(long, default_value = TOR_BULK_EXIT_LIST_URL)]
    pub bulk_exit_list_url: String,

    /// Seconds between refresh passes
    #[arg(long, default_value_t = REFRESH_INTERVAL_SECS)]
    pub refresh_interval_secs: u64,

    /// Total timeout for one upstream fetch in seconds
    #[arg(long, default_value_t = FETCH_TIMEOUT_SECS)]
    pub fetch_timeout_secs: u64,

    /// Store handle lifetime: shared|per-operation
    #[arg(long, value_enum, default_value_t = StoreMode::Shared)]
    pub store_mode: StoreMode,

    /// Port for the JSON/Prometheus status server (disabled when omitted)
    #[arg(long)]
    pub status_port: Option<u16>,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_STORE_DIR),
            addr: DEFAULT_LISTEN_ADDR.to_string(),
            source_policy: SourcePolicy::Alternate,
            exit_addresses_url: TOR_EXIT_ADDRESSES_URL.to_string(),
            bulk_exit_list_url: TOR_BULK_EXIT_LIST_URL.to_string(),
            refresh_interval_secs: REFRESH_INTERVAL_SECS,
            fetch_timeout_secs: FETCH_TIMEOUT_SECS,
            store_mode: StoreMode::Shared,
            status_port: None,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}

impl Config {
    /// Checks values clap cannot check on its own.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::ConfigError` if a source URL is not an
    /// absolute http(s) URL or an interval/timeout is zero.
    pub fn validate(&self) -> Result<(), InitializationError> {
        validate_source_url("exit-addresses-url", &self.exit_addresses_url)?;
        validate_source_url("bulk-exit-list-url", &self.bulk_exit_list_url)?;

        if self.refresh_interval_secs == 0 {
            return Err(InitializationError::ConfigError(
                "refresh-interval-secs must be greater than 0".to_string(),
            ));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(InitializationError::ConfigError(
                "fetch-timeout-secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn validate_source_url(name: &str, value: &str) -> Result<(), InitializationError> {
    let parsed = url::Url::parse(value)
        .map_err(|e| InitializationError::ConfigError(format!("{name} '{value}': {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(InitializationError::ConfigError(format!(
            "{name} '{value}': unsupported scheme '{other}'"
        ))),
    }
}
