//! Error handling and refresh statistics.
//!
//! This module provides:
//! - Error type definitions for initialization, storage, fetching and refresh passes
//! - Failure categorization for pass outcomes
//! - Thread-safe refresh statistics shared with the status server

mod stats;
mod types;

// Re-export public API
pub use stats::RefreshStats;
pub use types::{DatabaseError, FailureType, FetchError, InitializationError, RefreshError};
