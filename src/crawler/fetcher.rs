//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building the shared HTTP client with the configured user agent and timeout
//! - GET requests for listing and detail pages
//! - Classifying non-200 responses as fetch errors
//!
//! Nothing here retries. A failed request is reported once and the caller
//! decides what it means for the crawl.

use crate::config::Config;
use crate::ScoutError;
use reqwest::{Client, StatusCode};
use std::future::Future;
use std::time::Duration;

/// Something that can return the body of a page
///
/// The crawler only ever needs "GET this URL with these query parameters and
/// give me the HTML of a 200 response". Implementations must be shareable
/// across concurrently running fetches.
pub trait PageSource: Send + Sync + 'static {
    /// Fetches `url` with `query` appended and returns the response body
    ///
    /// Any status other than 200 is a [`ScoutError::Fetch`].
    fn get_page(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> impl Future<Output = Result<String, ScoutError>> + Send;
}

/// [`PageSource`] backed by a pooled `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    /// Builds the client from the crawl configuration
    pub fn new(config: &Config) -> Result<Self, ScoutError> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }
}

impl PageSource for HttpSource {
    async fn get_page(&self, url: &str, query: &[(String, String)]) -> Result<String, ScoutError> {
        fetch_page(&self.client, url, query).await
    }
}

/// Builds an HTTP client with proper configuration
///
/// The request timeout is the only cancellation mechanism in a crawl: it
/// ends the one request that hit it, nothing else.
///
/// # Example
///
/// ```no_run
/// use show_scout::config::Config;
/// use show_scout::crawler::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.header_value())
        .timeout(Duration::from_secs(config.crawler.request_timeout))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches one page and returns its body
///
/// # Error Mapping
///
/// | Condition                     | Error                  |
/// |-------------------------------|------------------------|
/// | Status other than 200         | `ScoutError::Fetch`    |
/// | Timeout, connect, body read   | `ScoutError::Http`     |
pub async fn fetch_page(
    client: &Client,
    url: &str,
    query: &[(String, String)],
) -> Result<String, ScoutError> {
    let response = client
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|source| ScoutError::Http {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    let final_url = response.url().to_string();

    if status != StatusCode::OK {
        tracing::debug!(url = %final_url, status = status.as_u16(), "Unexpected status");
        return Err(ScoutError::Fetch {
            url: final_url,
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|source| ScoutError::Http {
        url: final_url,
        source,
    })
}
