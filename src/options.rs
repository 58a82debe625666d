//! Search request options.

use serde::{Deserialize, Serialize};

use crate::ProviderKind;

/// A search request with all parameters.
///
/// Fields not understood by a given provider are ignored by its adapter;
/// the field-mapping tables live with each adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOptions {
    /// The search terms.
    pub query: String,
    /// Return fully populated results (title and description) from the
    /// scraping engine. When `false` only URLs are filled in.
    pub advanced: bool,
    /// Maximum number of results to return.
    pub num_results: usize,
    /// Time-based search filter (Google `tbs` syntax, e.g. "qdr:d").
    pub tbs: Option<String>,
    /// Duplicate-content filter flag passed through to Google-backed providers.
    pub filter: Option<String>,
    /// Interface language (e.g. "en").
    pub lang: String,
    /// Country/market code (e.g. "us").
    pub country: String,
    /// Free-form location bias for keyed providers that accept one.
    pub location: Option<String>,
    /// Outbound proxy override for this request (scraping engine only).
    pub proxy: Option<String>,
    /// Delay in seconds between successive page fetches (scraping engine only).
    pub sleep_interval: u64,
    /// Per-request deadline in milliseconds.
    pub timeout_ms: u64,
    /// Explicit provider override; `None` lets the resolver choose.
    pub provider: Option<ProviderKind>,
}

impl SearchOptions {
    /// Creates options for the given query with defaults.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            advanced: false,
            num_results: 5,
            tbs: None,
            filter: None,
            lang: "en".to_string(),
            country: "us".to_string(),
            location: None,
            proxy: None,
            sleep_interval: 2,
            timeout_ms: 5000,
            provider: None,
        }
    }

    /// Requests fully populated results from the scraping engine.
    pub fn with_advanced(mut self, advanced: bool) -> Self {
        self.advanced = advanced;
        self
    }

    /// Sets the maximum number of results.
    pub fn with_num_results(mut self, num_results: usize) -> Self {
        self.num_results = num_results;
        self
    }

    /// Sets the time-based search filter.
    pub fn with_tbs(mut self, tbs: impl Into<String>) -> Self {
        self.tbs = Some(tbs.into());
        self
    }

    /// Sets the duplicate-content filter flag.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Sets the interface language.
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    /// Sets the country/market code.
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    /// Sets the location bias.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Sets the outbound proxy override.
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Sets the inter-page delay in seconds.
    pub fn with_sleep_interval(mut self, seconds: u64) -> Self {
        self.sleep_interval = seconds;
        self
    }

    /// Sets the per-request deadline in milliseconds.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Forces a specific provider, bypassing the resolver.
    pub fn with_provider(mut self, provider: ProviderKind) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Region code in `country-lang` form (e.g. "us-en").
    pub fn region(&self) -> String {
        format!("{}-{}", self.country, self.lang)
    }
}
