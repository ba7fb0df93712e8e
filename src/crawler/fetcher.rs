//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building an HTTP client with a browser-compatible user agent
//! - GET requests to fetch page content
//! - Retry logic with exponential backoff for transient failures
//! - A politeness delay after every successful fetch

use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// User agent sent with every request
const USER_AGENT: &str = "Mozilla/5.0 (compatible; sitebinder/0.2)";

/// Errors from a single fetch operation
///
/// Any of these drops the page (and, for crawled pages, its subtree) from
/// the compiled document; the run itself continues.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP status {status}")]
    Http { status: u16 },

    #[error("Response is not a document ({content_type})")]
    NotDocument { content_type: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// HTTP fetcher with retry and rate limiting
///
/// Failures with a transient cause (HTTP 5xx, timeouts, connection errors)
/// are retried with exponential backoff; client errors such as 404 fail
/// immediately. After every successful fetch the configured politeness
/// delay is awaited before control returns to the caller.
pub struct HttpFetcher {
    client: Client,
    delay: Duration,
    max_retries: u32,
}

impl HttpFetcher {
    /// Builds a fetcher with the given politeness delay, retry count, and
    /// per-request timeout
    ///
    /// # Arguments
    ///
    /// * `delay` - Pause after each successful fetch
    /// * `max_retries` - Retries after the initial attempt for transient failures
    /// * `timeout` - Per-request timeout
    ///
    /// # Returns
    ///
    /// * `Ok(HttpFetcher)` - Successfully built fetcher
    /// * `Err(reqwest::Error)` - Failed to build the underlying client
    pub fn new(delay: Duration, max_retries: u32, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            delay,
            max_retries,
        })
    }

    /// The client, for callers that need raw requests (image downloads)
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Fetches a URL and returns its body as text
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 2xx | Success |
    /// | HTTP 4xx | Immediate failure |
    /// | HTTP 5xx | Retry with backoff |
    /// | Timeout / connection error | Retry with backoff |
    /// | Non-document Content-Type | Immediate failure |
    ///
    /// Backoff doubles per attempt, starting at one second.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let mut attempt = 0u32;

        loop {
            match self.try_fetch(url).await {
                Ok(body) => {
                    tokio::time::sleep(self.delay).await;
                    return Ok(body);
                }
                Err(err) if is_transient(&err) && attempt < self.max_retries => {
                    let backoff = Duration::from_secs(1u64 << attempt);
                    warn!(url, attempt, error = %err, "Fetch failed, retrying in {:?}", backoff);
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn try_fetch(&self, url: &str) -> Result<String, FetchError> {
        debug!(url, "Fetching");
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        // Pages without a Content-Type (and plain text, for simple servers)
        // are accepted; binary payloads are not
        if content_type.starts_with("image/") || content_type.contains("application/pdf") {
            return Err(FetchError::NotDocument { content_type });
        }

        Ok(response.text().await?)
    }
}

fn is_transient(err: &FetchError) -> bool {
    match err {
        FetchError::Http { status } => *status >= 500,
        FetchError::NotDocument { .. } => false,
        FetchError::Network(e) => e.is_timeout() || e.is_connect() || e.is_request(),
    }
}
