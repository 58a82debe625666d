//! Environment-backed provider settings.

/// Presence and values of the credentials and endpoints that decide which
/// providers are available.
#[derive(Debug, Clone, Default)]
pub struct ProviderSettings {
    /// Serper API key (`SERPER_API_KEY`).
    pub serper_api_key: Option<String>,
    /// SearchApi API key (`SEARCHAPI_API_KEY`).
    pub searchapi_api_key: Option<String>,
    /// SerpApi API key (`SERPAPI_API_KEY`).
    pub serpapi_api_key: Option<String>,
    /// Brave Search API key (`BRAVE_API_KEY`).
    pub brave_api_key: Option<String>,
    /// Whether the keyless DuckDuckGo backend is enabled (`DUCKDUCKGO_ENABLED`).
    pub duckduckgo_enabled: bool,
    /// Outbound proxy endpoint for the scraping engine (`SEARCH_PROXY`).
    pub proxy: Option<String>,
}

impl ProviderSettings {
    /// Reads settings from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through an arbitrary lookup function.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            serper_api_key: non_empty(get("SERPER_API_KEY")),
            searchapi_api_key: non_empty(get("SEARCHAPI_API_KEY")),
            serpapi_api_key: non_empty(get("SERPAPI_API_KEY")),
            brave_api_key: non_empty(get("BRAVE_API_KEY")),
            duckduckgo_enabled: truthy(get("DUCKDUCKGO_ENABLED")),
            proxy: non_empty(get("SEARCH_PROXY")),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn truthy(value: Option<String>) -> bool {
    matches!(
        value.as_deref().map(|v| v.trim().to_lowercase()).as_deref(),
        Some("1") | Some("true") | Some("yes") | Some("on")
    )
}
