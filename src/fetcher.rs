//! Page fetcher abstraction for retrieving HTML content.

use async_trait::async_trait;

use crate::Result;

/// Per-request fetch parameters.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Deadline for the request in milliseconds.
    pub timeout_ms: u64,
    /// Proxy URL to route the request through, if any.
    pub proxy: Option<String>,
}

/// Trait for fetching the body of a URL.
///
/// The scraping engine is written against this seam so tests can drive it
/// with canned HTML instead of the network.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches the body of the given URL.
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<String>;
}
