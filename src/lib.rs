//! # metaseek
//!
//! Multi-provider web search with automatic failover.
//!
//! Given a query, the library dispatches to one of several search backends
//! (a keyless scrape-based primary engine and several keyed alternatives),
//! normalizes their responses into a common result shape, and transparently
//! fails over to an alternative when the primary is rate limited. Each
//! backend adapter carries its own retry/backoff for transient errors.
//!
//! ## Example
//!
//! ```rust,no_run
//! use metaseek::{Search, SearchOptions};
//!
//! #[tokio::main]
//! async fn main() {
//!     let search = Search::from_env();
//!
//!     let options = SearchOptions::new("rust programming").with_num_results(10);
//!     let results = search.search(&options).await;
//!
//!     for result in &results {
//!         println!("{}: {}", result.title, result.url);
//!     }
//! }
//! ```

mod config;
mod error;
mod fetcher;
mod fetcher_http;
mod options;
mod provider;
mod result;
mod retry;
mod search;
mod tracker;

pub mod providers;

pub use config::ProviderSettings;
pub use error::{Result, SearchError};
pub use fetcher::{FetchOptions, PageFetcher};
pub use fetcher_http::HttpFetcher;
pub use options::SearchOptions;
pub use provider::{Provider, ProviderKind};
pub use result::SearchResult;
pub use retry::{with_retry, RetryPolicy};
pub use search::Search;
pub use tracker::{FailureTracker, TrackerConfig};
