//! Upstream exit node list fetching.
//!
//! A fetch is a single `GET` with the client's total timeout and no retry;
//! a failed pass is retried by the next scheduled refresh. The response body
//! is exposed as a buffered async reader that owns the response, so the
//! connection is released when the reader is dropped, whether it was read to
//! the end, abandoned on an error, or never read at all.

use std::io;
use std::sync::Arc;

use futures::{StreamExt, TryStreamExt};
use log::debug;
use tokio::io::AsyncBufRead;
use tokio_util::io::StreamReader;

use crate::error_handling::FetchError;
use crate::extract::extract_ips_from_reader;


/// Fetches upstream lists with a shared HTTP client.
#[derive(Clone)]
pub struct Fetcher {
    client: Arc<reqwest::Client>,
}

impl Fetcher {
    /// Creates a fetcher around a client built by [`crate::initialization::init_client`].
    pub fn new(client: Arc<reqwest::Client>) -> Self {
        Self { client }
    }

    /// Sends `GET url` and returns the body as a line-readable stream.
    ///
    /// # Errors
    ///
    /// Returns a `FetchError` on transport failure, timeout, or any non-2xx status.
    pub async fn fetch(&self, url: &str) -> Result<impl AsyncBufRead + Unpin + Send, FetchError> {
        debug!("Fetching exit node list from {url}");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?
            .error_for_status()
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let body = response.bytes_stream().map_err(io::Error::other).boxed();
        Ok(StreamReader::new(body))
    }

    /// Fetches `url` and extracts every address from the body.
    ///
    /// # Errors
    ///
    /// Returns a `FetchError` if the request fails or the body stream breaks
    /// before it is fully read.
    pub async fn fetch_ips(&self, url: &str) -> Result<Vec<String>, FetchError> {
        let reader = self.fetch(url).await?;
        let ips = extract_ips_from_reader(reader)
            .await
            .map_err(|e| FetchError::from_body_error(url, e))?;
        debug!("Extracted {} addresses from {url}", ips.len());
        Ok(ips)
    }
}
