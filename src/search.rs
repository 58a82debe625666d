//! Provider selection and failover orchestration.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::providers::{Brave, DuckDuckGo, Google, SearchApi, SerpApi, Serper};
use crate::{
    FailureTracker, HttpFetcher, Provider, ProviderKind, ProviderSettings, SearchOptions,
    SearchResult,
};

/// Search front end that picks a provider per request and fails over to
/// alternatives when the primary engine is rate limited.
///
/// Alternatives are held in fallback priority order; callers constructing
/// via [`Search::new`] can reorder or substitute them.
pub struct Search {
    primary: Arc<dyn Provider>,
    alternatives: Vec<Arc<dyn Provider>>,
    tracker: Arc<FailureTracker>,
}

impl Search {
    /// Creates a search instance from explicit providers and failure state.
    pub fn new(
        primary: Arc<dyn Provider>,
        alternatives: Vec<Arc<dyn Provider>>,
        tracker: Arc<FailureTracker>,
    ) -> Self {
        Self {
            primary,
            alternatives,
            tracker,
        }
    }

    /// Creates a search instance from environment configuration.
    pub fn from_env() -> Self {
        Self::from_settings(&ProviderSettings::from_env())
    }

    /// Creates a search instance from the given settings, with the default
    /// fallback priority order.
    pub fn from_settings(settings: &ProviderSettings) -> Self {
        let primary = Google::new(Arc::new(HttpFetcher::new()))
            .with_default_proxy(settings.proxy.clone());
        let alternatives: Vec<Arc<dyn Provider>> = vec![
            Arc::new(Serper::new(settings.serper_api_key.clone())),
            Arc::new(SearchApi::new(settings.searchapi_api_key.clone())),
            Arc::new(SerpApi::new(settings.serpapi_api_key.clone())),
            Arc::new(Brave::new(settings.brave_api_key.clone())),
            Arc::new(DuckDuckGo::new(settings.duckduckgo_enabled)),
        ];
        Self::new(
            Arc::new(primary),
            alternatives,
            Arc::new(FailureTracker::default()),
        )
    }

    /// The primary engine.
    pub fn primary(&self) -> &Arc<dyn Provider> {
        &self.primary
    }

    /// The alternatives in fallback priority order.
    pub fn alternatives(&self) -> &[Arc<dyn Provider>] {
        &self.alternatives
    }

    /// The injected failure tracker.
    pub fn tracker(&self) -> &Arc<FailureTracker> {
        &self.tracker
    }

    /// Selects the provider that should serve the next request.
    ///
    /// A pure function of configured providers, the tracker snapshot, and
    /// the current time: configured alternatives always dominate the
    /// primary; the primary is returned only when no alternative is
    /// configured. When nothing exists to fail over to, a tripped failure
    /// count is forgiven so the primary is retried instead of staying
    /// wedged.
    pub fn select_provider(&self) -> &Arc<dyn Provider> {
        self.tracker.maybe_recover();

        if let Some(alt) = self
            .alternatives
            .iter()
            .find(|provider| provider.is_configured())
        {
            debug!(provider = %alt.kind(), "selected alternative provider");
            return alt;
        }

        if self.tracker.is_tripped() {
            self.tracker.reset();
        }
        debug!(provider = %self.primary.kind(), "selected primary provider");
        &self.primary
    }

    /// Performs a search, never failing to the caller: every error path
    /// degrades to an empty list with the failure logged.
    pub async fn search(&self, options: &SearchOptions) -> Vec<SearchResult> {
        let provider = match options.provider {
            Some(kind) => match self.provider_by_kind(kind) {
                Some(provider) => provider,
                None => {
                    error!(provider = %kind, "requested provider is not registered");
                    return Vec::new();
                }
            },
            None => self.select_provider(),
        };

        info!(provider = %provider.kind(), query = %options.query, "dispatching search");

        match provider.execute(options).await {
            Ok(results) => {
                info!(
                    provider = %provider.kind(),
                    count = results.len(),
                    "search succeeded"
                );
                results
            }
            Err(err) if provider.kind().is_primary() && err.is_rate_limit() => {
                warn!(
                    provider = %provider.kind(),
                    error = %err,
                    "primary engine rate limited, failing over"
                );
                self.tracker.record_failure();
                self.failover(options).await
            }
            Err(err) => {
                error!(provider = %provider.kind(), error = %err, "search failed");
                Vec::new()
            }
        }
    }

    /// Walks the configured alternatives in priority order until one
    /// succeeds or all are exhausted.
    async fn failover(&self, options: &SearchOptions) -> Vec<SearchResult> {
        for alt in self
            .alternatives
            .iter()
            .filter(|provider| provider.is_configured())
        {
            info!(provider = %alt.kind(), "trying fallback provider");
            match alt.execute(options).await {
                Ok(results) => {
                    info!(
                        provider = %alt.kind(),
                        count = results.len(),
                        "fallback search succeeded"
                    );
                    return results;
                }
                Err(err) => {
                    warn!(provider = %alt.kind(), error = %err, "fallback provider failed");
                }
            }
        }
        error!("all fallback providers exhausted");
        Vec::new()
    }

    fn provider_by_kind(&self, kind: ProviderKind) -> Option<&Arc<dyn Provider>> {
        if self.primary.kind() == kind {
            return Some(&self.primary);
        }
        self.alternatives
            .iter()
            .find(|provider| provider.kind() == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Result, SearchError, TrackerConfig};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    enum Outcome {
        Results(Vec<SearchResult>),
        RateLimited,
        Backend,
    }

    struct MockProvider {
        kind: ProviderKind,
        configured: bool,
        outcome: Outcome,
        calls: AtomicUsize,
    }

    impl MockProvider {
        fn new(kind: ProviderKind, outcome: Outcome) -> Arc<Self> {
            Arc::new(Self {
                kind,
                configured: true,
                outcome,
                calls: AtomicUsize::new(0),
            })
        }

        fn unconfigured(kind: ProviderKind) -> Arc<Self> {
            Arc::new(Self {
                kind,
                configured: false,
                outcome: Outcome::Backend,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Provider for MockProvider {
        fn kind(&self) -> ProviderKind {
            self.kind
        }

        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn execute(&self, _options: &SearchOptions) -> Result<Vec<SearchResult>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.outcome {
                Outcome::Results(results) => Ok(results.clone()),
                Outcome::RateLimited => Err(SearchError::RateLimited {
                    status: Some(429),
                    message: "Too Many Requests".to_string(),
                }),
                Outcome::Backend => Err(SearchError::Backend {
                    status: Some(500),
                    message: "internal error".to_string(),
                }),
            }
        }
    }

    fn result(name: &str) -> Vec<SearchResult> {
        vec![SearchResult::new(
            format!("https://{name}.example.com/"),
            name,
            "content",
        )]
    }

    fn tracker(max_failures: u32, cooldown_secs: u64) -> Arc<FailureTracker> {
        Arc::new(FailureTracker::new(TrackerConfig {
            max_failures,
            cooldown: Duration::from_secs(cooldown_secs),
        }))
    }

    fn make_search(
        primary: Arc<MockProvider>,
        alternatives: Vec<Arc<MockProvider>>,
        tracker: Arc<FailureTracker>,
    ) -> Search {
        let alternatives = alternatives
            .into_iter()
            .map(|p| p as Arc<dyn Provider>)
            .collect();
        Search::new(primary, alternatives, tracker)
    }

    #[test]
    fn select_returns_primary_when_no_alternative_configured() {
        let primary = MockProvider::new(ProviderKind::Google, Outcome::Results(result("g")));
        let search = make_search(
            primary,
            vec![
                MockProvider::unconfigured(ProviderKind::Serper),
                MockProvider::unconfigured(ProviderKind::Brave),
            ],
            tracker(5, 1800),
        );

        // Regardless of failure count.
        for _ in 0..7 {
            assert_eq!(search.select_provider().kind(), ProviderKind::Google);
            search.tracker().record_failure();
        }
    }

    #[test]
    fn select_prefers_configured_alternative_below_threshold() {
        let primary = MockProvider::new(ProviderKind::Google, Outcome::Results(result("g")));
        let search = make_search(
            primary,
            vec![
                MockProvider::unconfigured(ProviderKind::Serper),
                MockProvider::new(ProviderKind::Brave, Outcome::Results(result("b"))),
            ],
            tracker(5, 1800),
        );

        assert_eq!(search.tracker().failures(), 0);
        assert_eq!(search.select_provider().kind(), ProviderKind::Brave);
    }

    #[test]
    fn select_returns_highest_priority_alternative_when_tripped() {
        let primary = MockProvider::new(ProviderKind::Google, Outcome::Results(result("g")));
        let search = make_search(
            primary,
            vec![
                MockProvider::unconfigured(ProviderKind::Serper),
                MockProvider::new(ProviderKind::SerpApi, Outcome::Results(result("sa"))),
                MockProvider::new(ProviderKind::Brave, Outcome::Results(result("b"))),
            ],
            tracker(5, 1800),
        );

        for _ in 0..5 {
            search.tracker().record_failure();
        }
        assert_eq!(search.select_provider().kind(), ProviderKind::SerpApi);
    }

    #[test]
    fn select_resets_tripped_count_when_nothing_to_fail_over_to() {
        let primary = MockProvider::new(ProviderKind::Google, Outcome::Results(result("g")));
        let search = make_search(primary, vec![], tracker(5, 1800));

        for _ in 0..5 {
            search.tracker().record_failure();
        }
        assert_eq!(search.select_provider().kind(), ProviderKind::Google);
        assert_eq!(search.tracker().failures(), 0);
    }

    #[test]
    fn select_applies_cooldown_recovery_first() {
        let primary = MockProvider::new(ProviderKind::Google, Outcome::Results(result("g")));
        // Zero cooldown: any elapsed time forgives the count.
        let search = make_search(primary, vec![], tracker(5, 0));

        search.tracker().record_failure();
        search.tracker().record_failure();
        assert_eq!(search.select_provider().kind(), ProviderKind::Google);
        assert_eq!(search.tracker().failures(), 0);
    }

    #[tokio::test]
    async fn search_returns_primary_results() {
        let primary = MockProvider::new(ProviderKind::Google, Outcome::Results(result("g")));
        let search = make_search(primary.clone(), vec![], tracker(5, 1800));

        let results = search.search(&SearchOptions::new("rust")).await;
        assert_eq!(results, result("g"));
        assert_eq!(primary.calls(), 1);
        assert_eq!(search.tracker().failures(), 0);
    }

    #[tokio::test]
    async fn search_fails_over_on_primary_rate_limit() {
        let primary = MockProvider::new(ProviderKind::Google, Outcome::RateLimited);
        let serper = MockProvider::new(ProviderKind::Serper, Outcome::Results(result("s")));
        let search = make_search(primary.clone(), vec![serper.clone()], tracker(5, 1800));

        // Force the primary so the rate limit actually occurs.
        let options = SearchOptions::new("rust").with_provider(ProviderKind::Google);
        let results = search.search(&options).await;

        assert_eq!(results, result("s"));
        assert_eq!(primary.calls(), 1);
        assert_eq!(serper.calls(), 1);
        assert_eq!(search.tracker().failures(), 1);
    }

    #[tokio::test]
    async fn search_failover_walks_priority_order() {
        let primary = MockProvider::new(ProviderKind::Google, Outcome::RateLimited);
        let serper = MockProvider::new(ProviderKind::Serper, Outcome::Backend);
        let searchapi = MockProvider::unconfigured(ProviderKind::SearchApi);
        let brave = MockProvider::new(ProviderKind::Brave, Outcome::Results(result("b")));
        let search = make_search(
            primary,
            vec![serper.clone(), searchapi.clone(), brave.clone()],
            tracker(5, 1800),
        );

        let options = SearchOptions::new("rust").with_provider(ProviderKind::Google);
        let results = search.search(&options).await;

        assert_eq!(results, result("b"));
        assert_eq!(serper.calls(), 1);
        assert_eq!(searchapi.calls(), 0);
        assert_eq!(brave.calls(), 1);
    }

    #[tokio::test]
    async fn search_failover_exhaustion_returns_empty() {
        let primary = MockProvider::new(ProviderKind::Google, Outcome::RateLimited);
        let serper = MockProvider::new(ProviderKind::Serper, Outcome::Backend);
        let search = make_search(primary, vec![serper.clone()], tracker(5, 1800));

        let options = SearchOptions::new("rust").with_provider(ProviderKind::Google);
        let results = search.search(&options).await;

        assert!(results.is_empty());
        assert_eq!(serper.calls(), 1);
    }

    #[tokio::test]
    async fn search_primary_non_rate_limit_error_does_not_fail_over() {
        let primary = MockProvider::new(ProviderKind::Google, Outcome::Backend);
        let serper = MockProvider::new(ProviderKind::Serper, Outcome::Results(result("s")));
        let search = make_search(primary.clone(), vec![serper.clone()], tracker(5, 1800));

        let options = SearchOptions::new("rust").with_provider(ProviderKind::Google);
        let results = search.search(&options).await;

        assert!(results.is_empty());
        assert_eq!(primary.calls(), 1);
        assert_eq!(serper.calls(), 0);
        assert_eq!(search.tracker().failures(), 0);
    }

    #[tokio::test]
    async fn search_alternative_error_does_not_retry_across_providers() {
        let primary = MockProvider::new(ProviderKind::Google, Outcome::Results(result("g")));
        let serper = MockProvider::new(ProviderKind::Serper, Outcome::RateLimited);
        let brave = MockProvider::new(ProviderKind::Brave, Outcome::Results(result("b")));
        let search = make_search(primary.clone(), vec![serper.clone(), brave.clone()], tracker(5, 1800));

        // Resolver picks serper (first configured alternative); its failure
        // terminates the request.
        let results = search.search(&SearchOptions::new("rust")).await;

        assert!(results.is_empty());
        assert_eq!(serper.calls(), 1);
        assert_eq!(brave.calls(), 0);
        assert_eq!(primary.calls(), 0);
        assert_eq!(search.tracker().failures(), 0);
    }

    #[tokio::test]
    async fn search_provider_override_bypasses_resolver() {
        let primary = MockProvider::new(ProviderKind::Google, Outcome::Results(result("g")));
        let serper = MockProvider::new(ProviderKind::Serper, Outcome::Results(result("s")));
        let brave = MockProvider::new(ProviderKind::Brave, Outcome::Results(result("b")));
        let search = make_search(primary, vec![serper.clone(), brave.clone()], tracker(5, 1800));

        let options = SearchOptions::new("rust").with_provider(ProviderKind::Brave);
        let results = search.search(&options).await;

        assert_eq!(results, result("b"));
        assert_eq!(serper.calls(), 0);
        assert_eq!(brave.calls(), 1);
    }

    #[tokio::test]
    async fn search_unknown_override_returns_empty() {
        let primary = MockProvider::new(ProviderKind::Google, Outcome::Results(result("g")));
        let search = make_search(primary.clone(), vec![], tracker(5, 1800));

        let options = SearchOptions::new("rust").with_provider(ProviderKind::Brave);
        let results = search.search(&options).await;

        assert!(results.is_empty());
        assert_eq!(primary.calls(), 0);
    }

    #[tokio::test]
    async fn repeated_rate_limits_accumulate_failures() {
        let primary = MockProvider::new(ProviderKind::Google, Outcome::RateLimited);
        let serper = MockProvider::new(ProviderKind::Serper, Outcome::Results(result("s")));
        let search = make_search(primary, vec![serper], tracker(5, 1800));

        let options = SearchOptions::new("rust").with_provider(ProviderKind::Google);
        for expected in 1..=3 {
            search.search(&options).await;
            assert_eq!(search.tracker().failures(), expected);
        }
    }

    #[test]
    fn from_settings_wires_default_priority_order() {
        let settings = ProviderSettings {
            serper_api_key: Some("k".to_string()),
            duckduckgo_enabled: true,
            ..Default::default()
        };
        let search = Search::from_settings(&settings);

        assert_eq!(search.primary().kind(), ProviderKind::Google);
        let kinds: Vec<ProviderKind> =
            search.alternatives().iter().map(|p| p.kind()).collect();
        assert_eq!(kinds.as_slice(), &ProviderKind::ALTERNATIVES);

        let configured: Vec<ProviderKind> = search
            .alternatives()
            .iter()
            .filter(|p| p.is_configured())
            .map(|p| p.kind())
            .collect();
        assert_eq!(
            configured,
            vec![ProviderKind::Serper, ProviderKind::DuckDuckGo]
        );
    }
}
