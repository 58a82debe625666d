//! HTTP-based page fetcher using reqwest.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Proxy};

use crate::fetcher::{FetchOptions, PageFetcher};
use crate::{Result, SearchError};

const USER_AGENT: &str = "Mozilla/5.0 (compatible; metaseek/0.3)";

/// A page fetcher that uses plain HTTP requests via reqwest.
///
/// Classifies HTTP 429/503 responses as rate limiting so the retry policy
/// and failover machinery can react to them.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a new `HttpFetcher` with default settings.
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .user_agent(USER_AGENT)
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// Creates an `HttpFetcher` with a custom reqwest client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<String> {
        // Proxying is a client-level concern in reqwest, so a proxied
        // request gets a dedicated client.
        let response = match &options.proxy {
            Some(proxy_url) => {
                let client = Client::builder()
                    .user_agent(USER_AGENT)
                    .proxy(Proxy::all(proxy_url)?)
                    .build()?;
                client
                    .get(url)
                    .timeout(Duration::from_millis(options.timeout_ms))
                    .send()
                    .await
            }
            None => {
                self.client
                    .get(url)
                    .timeout(Duration::from_millis(options.timeout_ms))
                    .send()
                    .await
            }
        }
        .map_err(|e| SearchError::from_reqwest(e, options.timeout_ms))?;

        let status = response.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("request failed");
            return Err(SearchError::from_status(status.as_u16(), reason));
        }

        let html = response
            .text()
            .await
            .map_err(|e| SearchError::from_reqwest(e, options.timeout_ms))?;
        Ok(html)
    }
}
