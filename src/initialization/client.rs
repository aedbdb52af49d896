//! HTTP client initialization.
//!
//! This module provides the function that builds the client used for
//! upstream exit node list fetches.

use std::sync::Arc;
use std::time::Duration;

use reqwest::ClientBuilder;

use crate::config::{Config, DEFAULT_USER_AGENT};
use crate::error_handling::InitializationError;

/// Initializes the HTTP client used by the fetcher.
///
/// Creates a `reqwest::Client` configured with:
/// - A total request timeout of `fetch_timeout_secs` (30s by default), covering
///   connect, headers and the whole body
/// - The crate User-Agent
/// - Default redirect following
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if client creation fails.
pub fn init_client(config: &Config) -> Result<Arc<reqwest::Client>, InitializationError> {
    let client = ClientBuilder::new()
        .timeout(Duration::from_secs(config.fetch_timeout_secs))
        .user_agent(DEFAULT_USER_AGENT)
        .build()?;
    Ok(Arc::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_client_with_default_config() {
        let client = init_client(&Config::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_init_client_with_short_timeout() {
        let config = Config {
            fetch_timeout_secs: 1,
            ..Default::default()
        };
        assert!(init_client(&config).is_ok());
    }
}
