//! Brave Search keyed API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use crate::providers::status_error;
use crate::retry::{with_retry, RetryPolicy};
use crate::{Provider, ProviderKind, Result, SearchError, SearchOptions, SearchResult};

const ENDPOINT: &str = "https://api.search.brave.com/res/v1/web/search";

/// Brave Search adapter: GET, key in the `X-Subscription-Token` header.
///
/// An empty `web.results` section is a valid zero-match outcome, not an
/// error.
pub struct Brave {
    api_key: Option<String>,
    client: Client,
    retry: RetryPolicy,
}

impl Brave {
    /// Creates a new Brave adapter; `api_key` comes from `BRAVE_API_KEY`.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            client: Client::builder()
                .user_agent("Mozilla/5.0 (compatible; metaseek/0.3)")
                .build()
                .expect("Failed to create HTTP client"),
            retry: RetryPolicy::default(),
        }
    }

    /// Overrides the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn request(&self, key: &str, options: &SearchOptions) -> Result<String> {
        let count = options.num_results.to_string();
        let response = self
            .client
            .get(ENDPOINT)
            .header("Accept", "application/json")
            .header("X-Subscription-Token", key)
            .query(&[
                ("q", options.query.as_str()),
                ("count", count.as_str()),
                ("search_lang", options.lang.as_str()),
                ("country", options.country.as_str()),
            ])
            .timeout(Duration::from_millis(options.timeout_ms))
            .send()
            .await
            .map_err(|e| SearchError::from_reqwest(e, options.timeout_ms))?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        response
            .text()
            .await
            .map_err(|e| SearchError::from_reqwest(e, options.timeout_ms))
    }

    fn parse_results(&self, body: &str, num_results: usize) -> Result<Vec<SearchResult>> {
        let parsed: BraveResponse =
            serde_json::from_str(body).map_err(|e| SearchError::Parse(e.to_string()))?;

        let mut results: Vec<SearchResult> = parsed
            .web
            .results
            .into_iter()
            .filter(|item| !item.url.is_empty())
            .map(|item| SearchResult::new(item.url, item.title, item.description))
            .collect();

        if results.is_empty() {
            warn!(provider = %ProviderKind::Brave, "backend returned no web results");
        }
        results.truncate(num_results);
        Ok(results)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BraveResponse {
    web: BraveWeb,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BraveWeb {
    results: Vec<BraveItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BraveItem {
    url: String,
    title: String,
    description: String,
}

#[async_trait]
impl Provider for Brave {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Brave
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn execute(&self, options: &SearchOptions) -> Result<Vec<SearchResult>> {
        let key = self
            .api_key
            .clone()
            .ok_or(SearchError::MissingCredential {
                provider: ProviderKind::Brave,
                variable: "BRAVE_API_KEY",
            })?;

        let body = with_retry(&self.retry, self.kind(), || self.request(&key, options)).await?;
        self.parse_results(&body, options.num_results)
    }
}
