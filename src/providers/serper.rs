//! Serper keyed search API (highest-priority alternative).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::providers::status_error;
use crate::retry::{with_retry, RetryPolicy};
use crate::{Provider, ProviderKind, Result, SearchError, SearchOptions, SearchResult};

const ENDPOINT: &str = "https://google.serper.dev/search";

/// Serper adapter: POST JSON, key in the `X-API-KEY` header.
pub struct Serper {
    api_key: Option<String>,
    client: Client,
    retry: RetryPolicy,
}

impl Serper {
    /// Creates a new Serper adapter; `api_key` comes from `SERPER_API_KEY`.
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
        let mut payload = json!({
            "q": options.query,
            "num": options.num_results,
            "hl": options.lang,
            "gl": options.country,
        });
        if let Some(tbs) = &options.tbs {
            payload["tbs"] = json!(tbs);
        }
        if let Some(filter) = &options.filter {
            payload["filter"] = json!(filter);
        }
        if let Some(location) = &options.location {
            payload["location"] = json!(location);
        }

        let response = self
            .client
            .post(ENDPOINT)
            .header("X-API-KEY", key)
            .json(&payload)
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
        let parsed: SerperResponse =
            serde_json::from_str(body).map_err(|e| SearchError::Parse(e.to_string()))?;

        let mut results: Vec<SearchResult> = parsed
            .organic
            .into_iter()
            .filter(|item| !item.link.is_empty())
            .map(|item| SearchResult::new(item.link, item.title, item.snippet))
            .collect();
        results.truncate(num_results);
        Ok(results)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SerperResponse {
    organic: Vec<SerperItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SerperItem {
    title: String,
    link: String,
    snippet: String,
}

#[async_trait]
impl Provider for Serper {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Serper
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn execute(&self, options: &SearchOptions) -> Result<Vec<SearchResult>> {
        let key = self
            .api_key
            .clone()
            .ok_or(SearchError::MissingCredential {
                provider: ProviderKind::Serper,
                variable: "SERPER_API_KEY",
            })?;

        let body = with_retry(&self.retry, self.kind(), || self.request(&key, options)).await?;
        self.parse_results(&body, options.num_results)
    }
}
