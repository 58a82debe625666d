//! SerpApi keyed search API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::providers::status_error;
use crate::retry::{with_retry, RetryPolicy};
use crate::{Provider, ProviderKind, Result, SearchError, SearchOptions, SearchResult};

const ENDPOINT: &str = "https://serpapi.com/search.json";

/// SerpApi adapter: GET, key as a query parameter.
pub struct SerpApi {
    api_key: Option<String>,
    client: Client,
    retry: RetryPolicy,
}

impl SerpApi {
    /// Creates a new SerpApi adapter; `api_key` comes from `SERPAPI_API_KEY`.
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
            ("api_key", key),
            ("engine", "google"),
            ("q", options.query.as_str()),
            ("num", num.as_str()),
            ("hl", options.lang.as_str()),
            ("gl", options.country.as_str()),
        ];
        if let Some(tbs) = &options.tbs {
            params.push(("tbs", tbs.as_str()));
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
        let parsed: SerpApiResponse =
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
struct SerpApiResponse {
    organic_results: Vec<SerpApiItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SerpApiItem {
    title: String,
    link: String,
    snippet: String,
}

#[async_trait]
impl Provider for SerpApi {
    fn kind(&self) -> ProviderKind {
        ProviderKind::SerpApi
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn execute(&self, options: &SearchOptions) -> Result<Vec<SearchResult>> {
        let key = self
            .api_key
            .clone()
            .ok_or(SearchError::MissingCredential {
                provider: ProviderKind::SerpApi,
                variable: "SERPAPI_API_KEY",
            })?;

        let body = with_retry(&self.retry, self.kind(), || self.request(&key, options)).await?;
        self.parse_results(&body, options.num_results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "search_metadata": {"status": "Success"},
        "organic_results": [
            {"title": "Rust", "link": "https://www.rust-lang.org/", "snippet": "Systems language."},
            {"title": "Rustup", "link": "https://rustup.rs/", "snippet": "Toolchain installer."},
            {"title": "Docs", "link": "https://docs.rs/", "snippet": "Crate docs."}
        ]
    }"#;

    #[test]
    fn test_is_configured() {
        assert!(SerpApi::new(Some("key".into())).is_configured());
        assert!(!SerpApi::new(None).is_configured());
    }

    #[test]
    fn test_parse_results_maps_fields() {
        let adapter = SerpApi::new(None);
        let results = adapter.parse_results(BODY, 10).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[2].url, "https://docs.rs/");
        assert_eq!(results[2].title, "Docs");
        assert_eq!(results[2].description, "Crate docs.");
    }

    #[test]
    fn test_parse_results_ignores_unknown_sections() {
        // search_metadata and other sections are skipped by the typed parse.
        let adapter = SerpApi::new(None);
        let results = adapter.parse_results(BODY, 2).unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_parse_results_empty_body() {
        let adapter = SerpApi::new(None);
        assert!(adapter.parse_results("{}", 5).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_execute_without_key_fails_fast() {
        let adapter = SerpApi::new(None);
        let err = adapter
            .execute(&SearchOptions::new("rust"))
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::MissingCredential { .. }));
    }
}
