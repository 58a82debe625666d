//! DuckDuckGo Instant Answer API (keyless, opt-in alternative).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::providers::status_error;
use crate::retry::{with_retry, RetryPolicy};
use crate::{Provider, ProviderKind, Result, SearchError, SearchOptions, SearchResult};

const ENDPOINT: &str = "https://api.duckduckgo.com/";

/// DuckDuckGo adapter over the Instant Answer API.
///
/// The API has no plain results list; instead three response sections are
/// merged in fixed priority: the abstract (featured snippet) if present,
/// then the results list, then related topics. Category-only topics carry
/// no URL and are skipped.
pub struct DuckDuckGo {
    enabled: bool,
    client: Client,
    retry: RetryPolicy,
}

impl DuckDuckGo {
    /// Creates a new DuckDuckGo adapter; `enabled` comes from
    /// `DUCKDUCKGO_ENABLED`.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
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

    async fn request(&self, options: &SearchOptions) -> Result<String> {
        let region = options.region();
        let response = self
            .client
            .get(ENDPOINT)
            .query(&[
                ("q", options.query.as_str()),
                ("format", "json"),
                ("no_html", "1"),
                ("kl", region.as_str()),
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
        let answer: InstantAnswer =
            serde_json::from_str(body).map_err(|e| SearchError::Parse(e.to_string()))?;
        Ok(merge_sections(answer, num_results))
    }
}

/// Merges the abstract, results list, and related topics in fixed priority,
/// truncating after concatenation.
fn merge_sections(answer: InstantAnswer, num_results: usize) -> Vec<SearchResult> {
    let mut results = Vec::new();

    if !answer.abstract_text.is_empty() {
        results.push(SearchResult::new(
            answer.abstract_url,
            answer.heading,
            answer.abstract_text,
        ));
    }

    for item in answer.results {
        if item.first_url.is_empty() {
            continue;
        }
        // No separate snippet field; the description falls back to the
        // link text.
        results.push(SearchResult::new(
            item.first_url,
            item.text.clone(),
            item.text,
        ));
    }

    for topic in answer.related_topics {
        // Category-only topics have no URL of their own.
        if topic.first_url.is_empty() {
            continue;
        }
        let (title, description) = split_topic_text(&topic.text);
        results.push(SearchResult::new(topic.first_url, title, description));
    }

    results.truncate(num_results);
    results
}

/// Splits topic text on the first `" - "` into title and description,
/// falling back to the full text for both when no separator is present.
fn split_topic_text(text: &str) -> (String, String) {
    match text.split_once(" - ") {
        Some((title, description)) => (title.to_string(), description.to_string()),
        None => (text.to_string(), text.to_string()),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InstantAnswer {
    #[serde(rename = "Heading")]
    heading: String,
    #[serde(rename = "AbstractText")]
    abstract_text: String,
    #[serde(rename = "AbstractURL")]
    abstract_url: String,
    #[serde(rename = "Results")]
    results: Vec<Topic>,
    #[serde(rename = "RelatedTopics")]
    related_topics: Vec<Topic>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Topic {
    #[serde(rename = "FirstURL")]
    first_url: String,
    #[serde(rename = "Text")]
    text: String,
}

#[async_trait]
impl Provider for DuckDuckGo {
    fn kind(&self) -> ProviderKind {
        ProviderKind::DuckDuckGo
    }

    fn is_configured(&self) -> bool {
        self.enabled
    }

    async fn execute(&self, options: &SearchOptions) -> Result<Vec<SearchResult>> {
        if !self.enabled {
            return Err(SearchError::MissingCredential {
                provider: ProviderKind::DuckDuckGo,
                variable: "DUCKDUCKGO_ENABLED",
            });
        }

        let body = with_retry(&self.retry, self.kind(), || self.request(options)).await?;
        self.parse_results(&body, options.num_results)
    }
}
