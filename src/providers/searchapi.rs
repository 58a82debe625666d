//! SearchApi keyed search API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::providers::status_error;
use crate::retry::{with_retry, RetryPolicy};
use crate::{Provider, ProviderKind, Result, SearchError, SearchOptions, SearchResult};

const ENDPOINT: &str = "https://www.searchapi.io/api/v1/search";

/// SearchApi adapter: GET, key as a bearer token.
pub struct SearchApi {
    api_key: Option<String>,
    client: Client,
    retry: RetryPolicy,
}

impl SearchApi {
    /// Creates a new SearchApi adapter; `api_key` comes from `SEARCHAPI_API_KEY`.
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
        let num = options.num_results.to_string();
        let mut params = vec![
            ("engine", "google"),
            ("q", options.query.as_str()),
            ("num", num.as_str()),
            ("hl", options.lang.as_str()),
            ("gl", options.country.as_str()),
        ];
        if let Some(tbs) = &options.tbs {
            params.push(("time_period", tbs.as_str()));
        }
        if let Some(filter) = &options.filter {
            params.push(("filter", filter.as_str()));
        }
        if let Some(location) = &options.location {
            params.push(("location", location.as_str()));
        }

        let response = self
            .client
            .get(ENDPOINT)
            .bearer_auth(key)
            .query(&params)
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
        let parsed: SearchApiResponse =
            serde_json::from_str(body).map_err(|e| SearchError::Parse(e.to_string()))?;

        let mut results: Vec<SearchResult> = parsed
            .organic_results
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
struct SearchApiResponse {
    organic_results: Vec<SearchApiItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchApiItem {
    title: String,
    link: String,
    snippet: String,
}

#[async_trait]
impl Provider for SearchApi {
    fn kind(&self) -> ProviderKind {
        ProviderKind::SearchApi
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn execute(&self, options: &SearchOptions) -> Result<Vec<SearchResult>> {
        let key = self
            .api_key
            .clone()
            .ok_or(SearchError::MissingCredential {
                provider: ProviderKind::SearchApi,
                variable: "SEARCHAPI_API_KEY",
            })?;

        let body = with_retry(&self.retry, self.kind(), || self.request(&key, options)).await?;
        self.parse_results(&body, options.num_results)
    }
}
