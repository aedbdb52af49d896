//! Error type definitions.
//!
//! This module defines the error types used throughout the application and the
//! failure categories tracked by the refresh statistics.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// A configured value is unusable (e.g. a source URL that does not parse).
    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

/// Error types for database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error creating the storage directory or database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    /// Schema migration error.
    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
}

/// Error returned when an upstream exit node list could not be fetched.
///
/// Callers treat every variant the same way (the pass is skipped); the
/// variants only exist so the log line says what went wrong.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The request did not complete within the client timeout.
    #[error("request to {url} timed out")]
    Timeout { url: String },

    /// The server answered with a non-success status code.
    #[error("request to {url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    /// Connection, DNS, TLS or any other transport failure.
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: ReqwestError,
    },

    /// The response body stream broke while it was being read.
    #[error("reading response body from {url} failed: {source}")]
    Body {
        url: String,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    /// Classifies a `reqwest` error raised while sending a request to `url`.
    pub fn from_reqwest(url: &str, error: ReqwestError) -> Self {
        if error.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else if let Some(status) = error.status() {
            FetchError::Status {
                url: url.to_string(),
                status,
            }
        } else {
            FetchError::Request {
                url: url.to_string(),
                source: error,
            }
        }
    }

    /// Classifies an I/O error raised while streaming the body of `url`.
    ///
    /// The body stream wraps client errors in `io::Error`; a wrapped timeout is
    /// still reported as a timeout.
    pub fn from_body_error(url: &str, error: std::io::Error) -> Self {
        let timed_out = error
            .get_ref()
            .and_then(|inner| inner.downcast_ref::<ReqwestError>())
            .is_some_and(ReqwestError::is_timeout);
        if timed_out {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Body {
                url: url.to_string(),
                source: error,
            }
        }
    }
}

/// Error that aborted a single refresh pass.
#[derive(Error, Debug)]
pub enum RefreshError {
    /// The upstream list could not be fetched or read.
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Persisting the extracted addresses failed part way through.
    #[error("store update failed: {0}")]
    Store(#[from] DatabaseError),
}

impl RefreshError {
    /// Maps the error onto the counter it is tracked under.
    pub fn failure_type(&self) -> FailureType {
        match self {
            RefreshError::Fetch(FetchError::Timeout { .. }) => FailureType::FetchTimeout,
            RefreshError::Fetch(FetchError::Status { .. }) => FailureType::FetchStatus,
            RefreshError::Fetch(FetchError::Request { .. }) => FailureType::FetchRequest,
            RefreshError::Fetch(FetchError::Body { .. }) => FailureType::FetchBody,
            RefreshError::Store(_) => FailureType::StoreWrite,
        }
    }
}

/// Failure categories counted per refresh pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum FailureType {
    FetchTimeout,
    FetchStatus,
    FetchRequest,
    FetchBody,
    StoreWrite,
    /// The deny list handler could not read the store.
    StoreRead,
}

impl std::fmt::Display for FailureType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FailureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureType::FetchTimeout => "Fetch timeout",
            FailureType::FetchStatus => "Fetch non-success status",
            FailureType::FetchRequest => "Fetch request error",
            FailureType::FetchBody => "Fetch body read error",
            FailureType::StoreWrite => "Store write error",
            FailureType::StoreRead => "Store read error",
        }
    }

    /// Label used for this category in the Prometheus exposition.
    pub fn metric_label(&self) -> &'static str {
        match self {
            FailureType::FetchTimeout => "fetch_timeout",
            FailureType::FetchStatus => "fetch_status",
            FailureType::FetchRequest => "fetch_request",
            FailureType::FetchBody => "fetch_body",
            FailureType::StoreWrite => "store_write",
            FailureType::StoreRead => "store_read",
        }
    }

    /// Whether this category belongs to the fetch stage of a pass.
    pub fn is_fetch(&self) -> bool {
        matches!(
            self,
            FailureType::FetchTimeout
                | FailureType::FetchStatus
                | FailureType::FetchRequest
                | FailureType::FetchBody
        )
    }
}
