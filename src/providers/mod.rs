//! Provider adapter implementations.

mod brave;
mod duckduckgo;
mod google;
mod searchapi;
mod serpapi;
mod serper;

pub use brave::Brave;
pub use duckduckgo::DuckDuckGo;
pub use google::Google;
pub use searchapi::SearchApi;
pub use serpapi::SerpApi;
pub use serper::Serper;

use crate::SearchError;

/// Turns a non-success HTTP response into the matching error kind, carrying
/// a snippet of the backend's body text.
pub(crate) async fn status_error(response: reqwest::Response) -> SearchError {
    let status = response.status();
    let reason = status.canonical_reason().unwrap_or("request failed");
    let body = response.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        reason.to_string()
    } else {
        body.chars().take(512).collect()
    };
    SearchError::from_status(status.as_u16(), message)
}
