//! Google web search via HTML scraping (the primary engine).
//!
//! Keyless and rate-limit-prone: requests self-throttle with a configurable
//! inter-page delay, and CAPTCHA interstitials are classified as rate
//! limiting so the failover machinery can react.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};
use tokio::time::sleep;
use tracing::debug;

use crate::fetcher::{FetchOptions, PageFetcher};
use crate::retry::{with_retry, RetryPolicy};
use crate::{Provider, ProviderKind, Result, SearchError, SearchOptions, SearchResult};

/// Google search engine scraping `www.google.com/search` result pages.
pub struct Google {
    fetcher: Arc<dyn PageFetcher>,
    retry: RetryPolicy,
    default_proxy: Option<String>,
}

impl Google {
    /// Creates a new Google engine with the given page fetcher.
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            retry: RetryPolicy::default(),
            default_proxy: None,
        }
    }

    /// Sets the proxy used when a request carries no proxy override.
    pub fn with_default_proxy(mut self, proxy: Option<String>) -> Self {
        self.default_proxy = proxy;
        self
    }

    /// Overrides the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn build_url(&self, options: &SearchOptions, start: usize) -> String {
        let mut url = format!(
            "https://www.google.com/search?q={}&num={}&hl={}&gl={}&start={}",
            urlencoding::encode(&options.query),
            options.num_results,
            options.lang,
            options.country,
            start
        );
        if let Some(tbs) = &options.tbs {
            url.push_str("&tbs=");
            url.push_str(&urlencoding::encode(tbs));
        }
        if let Some(filter) = &options.filter {
            url.push_str("&filter=");
            url.push_str(&urlencoding::encode(filter));
        }
        url
    }

    async fn fetch_page(&self, url: &str, options: &SearchOptions) -> Result<String> {
        let fetch_options = FetchOptions {
            timeout_ms: options.timeout_ms,
            proxy: options
                .proxy
                .clone()
                .or_else(|| self.default_proxy.clone()),
        };
        let html = self.fetcher.fetch(url, &fetch_options).await?;

        // Detect CAPTCHA / bot-block pages before parsing.
        if html.contains("/sorry/index") || html.contains("recaptcha") {
            return Err(SearchError::RateLimited {
                status: None,
                message: "Too many requests: Google returned a CAPTCHA page".to_string(),
            });
        }

        Ok(html)
    }

    fn parse_results(&self, html: &str, advanced: bool) -> Result<Vec<SearchResult>> {
        let document = Html::parse_document(html);

        let container_selector = Selector::parse("div.g")
            .map_err(|e| SearchError::Parse(format!("Failed to parse selector: {:?}", e)))?;
        let title_selector = Selector::parse("h3")
            .map_err(|e| SearchError::Parse(format!("Failed to parse selector: {:?}", e)))?;
        let link_selector = Selector::parse("a[href]")
            .map_err(|e| SearchError::Parse(format!("Failed to parse selector: {:?}", e)))?;
        let snippet_selector = Selector::parse("div[data-sncf], div.VwiC3b")
            .map_err(|e| SearchError::Parse(format!("Failed to parse selector: {:?}", e)))?;

        let mut results = Vec::new();

        for element in document.select(&container_selector) {
            let title = match element.select(&title_selector).next() {
                Some(el) => el.text().collect::<String>().trim().to_string(),
                None => continue,
            };

            let url = match element.select(&link_selector).next() {
                Some(el) => {
                    let href = el.value().attr("href").unwrap_or_default();
                    // Skip Google's internal links
                    if href.starts_with('/') && !href.starts_with("/url?") {
                        continue;
                    }
                    // Extract actual URL from /url?q= redirects
                    if let Some(q) = href.strip_prefix("/url?q=") {
                        q.split('&').next().unwrap_or(q).to_string()
                    } else {
                        href.to_string()
                    }
                }
                None => continue,
            };

            if url.is_empty() || title.is_empty() {
                continue;
            }

            if advanced {
                let description = element
                    .select(&snippet_selector)
                    .next()
                    .map(|el| el.text().collect::<String>().trim().to_string())
                    .unwrap_or_default();
                results.push(SearchResult::new(url, title, description));
            } else {
                results.push(SearchResult::new(url, "", ""));
            }
        }

        Ok(results)
    }
}

#[async_trait]
impl Provider for Google {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Google
    }

    fn is_configured(&self) -> bool {
        // Keyless; always available as the last resort.
        true
    }

    async fn execute(&self, options: &SearchOptions) -> Result<Vec<SearchResult>> {
        let mut results = Vec::new();
        let mut start = 0usize;

        while results.len() < options.num_results {
            let url = self.build_url(options, start);
            let html = with_retry(&self.retry, self.kind(), || {
                self.fetch_page(&url, options)
            })
            .await?;

            let page = self.parse_results(&html, options.advanced)?;
            if page.is_empty() {
                debug!(start, "no further results");
                break;
            }

            start += page.len();
            results.extend(page);

            if results.len() < options.num_results {
                // Self-throttle between page fetches.
                sleep(Duration::from_secs(options.sleep_interval)).await;
            }
        }

        results.truncate(options.num_results);
        Ok(results)
    }
}
