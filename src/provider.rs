//! Provider identity and capability interface.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Result, SearchOptions, SearchResult};

/// Identifies a search backend. Used for routing and logging only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Keyless scrape-based Google web search (the primary engine).
    Google,
    /// Serper keyed API.
    Serper,
    /// SearchApi keyed API.
    SearchApi,
    /// SerpApi keyed API.
    SerpApi,
    /// Brave Search keyed API.
    Brave,
    /// DuckDuckGo Instant Answer API (keyless, opt-in).
    DuckDuckGo,
}

impl ProviderKind {
    /// Alternatives in fixed fallback priority order.
    pub const ALTERNATIVES: [ProviderKind; 5] = [
        ProviderKind::Serper,
        ProviderKind::SearchApi,
        ProviderKind::SerpApi,
        ProviderKind::Brave,
        ProviderKind::DuckDuckGo,
    ];

    /// Whether this is the primary (scrape-based) engine.
    pub fn is_primary(&self) -> bool {
        matches!(self, ProviderKind::Google)
    }

    /// Stable lowercase identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Google => "google",
            ProviderKind::Serper => "serper",
            ProviderKind::SearchApi => "searchapi",
            ProviderKind::SerpApi => "serpapi",
            ProviderKind::Brave => "brave",
            ProviderKind::DuckDuckGo => "duckduckgo",
        }
    }

    /// Environment variable that configures this provider, if it needs one.
    pub fn env_var(&self) -> Option<&'static str> {
        match self {
            ProviderKind::Google => None,
            ProviderKind::Serper => Some("SERPER_API_KEY"),
            ProviderKind::SearchApi => Some("SEARCHAPI_API_KEY"),
            ProviderKind::SerpApi => Some("SERPAPI_API_KEY"),
            ProviderKind::Brave => Some("BRAVE_API_KEY"),
            ProviderKind::DuckDuckGo => Some("DUCKDUCKGO_ENABLED"),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "google" | "g" => Ok(ProviderKind::Google),
            "serper" => Ok(ProviderKind::Serper),
            "searchapi" => Ok(ProviderKind::SearchApi),
            "serpapi" => Ok(ProviderKind::SerpApi),
            "brave" => Ok(ProviderKind::Brave),
            "duckduckgo" | "ddg" => Ok(ProviderKind::DuckDuckGo),
            other => Err(format!("unknown provider: {}", other)),
        }
    }
}

/// Trait all search backends implement.
///
/// The resolver and orchestrator are written once against this interface;
/// each backend's field-mapping quirks stay inside its own implementation.
#[async_trait]
pub trait Provider: Send + Sync {
    /// The identity of this backend.
    fn kind(&self) -> ProviderKind;

    /// Whether the credential/endpoint/enable flag this backend needs is present.
    fn is_configured(&self) -> bool;

    /// Performs a search and returns normalized results.
    async fn execute(&self, options: &SearchOptions) -> Result<Vec<SearchResult>>;
}
