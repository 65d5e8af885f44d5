//! The search facade: classify, consult the cache, fan out, cache the answer.
//!
//! An [`Aggregator`] owns the registered adapters, an injected
//! [`CacheStore`] and, when enabled, a per-engine [`CircuitBreaker`]. Network
//! calls happen only on a cache miss, and queries classified as
//! [`QueryCategory::None`](crate::classify::QueryCategory::None) are always
//! fetched fresh.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::cache::{CacheKey, CacheStats, CacheStore};
use crate::circuit_breaker::{CircuitBreaker, CircuitState};
use crate::classify::classify;
use crate::config::SearchConfig;
use crate::engine::EngineAdapter;
use crate::engines;
use crate::error::SearchError;
use crate::orchestrator::{fan_out, FanOut};
use crate::types::{EngineId, SearchResult};

/// Shared result cache type used by the aggregator.
pub type ResultCache = CacheStore<Vec<SearchResult>>;

/// Entry point used by the response-generation layer.
pub struct Aggregator {
    adapters: Vec<Arc<dyn EngineAdapter>>,
    cache: Arc<ResultCache>,
    per_adapter_timeout: Duration,
    breaker: Option<Mutex<CircuitBreaker>>,
}

impl std::fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aggregator")
            .field("adapters", &self.engines())
            .field("per_adapter_timeout", &self.per_adapter_timeout)
            .field("breaker", &self.breaker.is_some())
            .finish_non_exhaustive()
    }
}

impl Aggregator {
    /// Build an aggregator over explicit adapters and cache.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `adapters` is empty or the
    /// per-adapter timeout is zero. This is the only way the facade fails.
    pub fn new(
        adapters: Vec<Arc<dyn EngineAdapter>>,
        cache: Arc<ResultCache>,
        config: &SearchConfig,
    ) -> Result<Self, SearchError> {
        if adapters.is_empty() {
            return Err(SearchError::Config(
                "at least one adapter must be registered".into(),
            ));
        }
        if config.per_adapter_timeout_secs == 0 {
            return Err(SearchError::Config(
                "per_adapter_timeout_secs must be greater than 0".into(),
            ));
        }
        let breaker = config
            .circuit_breaker
            .is_enabled()
            .then(|| Mutex::new(CircuitBreaker::new(config.circuit_breaker.clone())));

        Ok(Self {
            adapters,
            cache,
            per_adapter_timeout: Duration::from_secs(config.per_adapter_timeout_secs),
            breaker,
        })
    }

    /// Build an aggregator with the real adapters enabled in `config` and a
    /// fresh wall-clock cache.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] for invalid configuration, or
    /// [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &SearchConfig) -> Result<Self, SearchError> {
        let adapters = engines::build_adapters(config)?;
        let cache = Arc::new(ResultCache::new(config.cache_max_entries));
        Self::new(adapters, cache, config)
    }

    /// Search all engines, answering from the cache when possible.
    ///
    /// Never fails: engine errors and timeouts only shrink the result set, and
    /// an empty vector means nothing was found anywhere.
    pub async fn search(&self, query: &str) -> Vec<SearchResult> {
        if query.trim().is_empty() {
            tracing::debug!("empty query, nothing to search");
            return Vec::new();
        }

        let classification = classify(query);
        let key = CacheKey::new(query, classification.category);
        tracing::trace!(query, category = %classification.category, "search requested");

        if classification.is_cacheable() {
            if let Some(hit) = self.cache.get(&key).await {
                return hit;
            }
        }

        let round = fan_out(query, &self.select_adapters(), self.per_adapter_timeout).await;
        self.record_health(&round);

        // A round where no engine answered says nothing about the query.
        if classification.is_cacheable() && round.succeeded() > 0 {
            self.cache.put(key, round.results.clone()).await;
        }

        tracing::info!(
            category = %classification.category,
            engines = round.succeeded(),
            results = round.results.len(),
            "search complete"
        );
        round.results
    }

    /// Adapters allowed to run this round. If the breaker has every engine
    /// open, all of them are tried anyway rather than returning nothing.
    fn select_adapters(&self) -> Vec<Arc<dyn EngineAdapter>> {
        let Some(ref breaker) = self.breaker else {
            return self.adapters.clone();
        };
        let mut breaker = breaker.lock().unwrap_or_else(PoisonError::into_inner);
        let selected: Vec<_> = self
            .adapters
            .iter()
            .filter(|a| breaker.should_attempt(a.id()))
            .cloned()
            .collect();

        if selected.is_empty() {
            tracing::debug!("every engine circuit is open, probing all");
            return self.adapters.clone();
        }
        if selected.len() < self.adapters.len() {
            tracing::debug!(
                skipped = self.adapters.len() - selected.len(),
                "engines skipped by circuit breaker"
            );
        }
        selected
    }

    fn record_health(&self, round: &FanOut) {
        let Some(ref breaker) = self.breaker else {
            return;
        };
        let mut breaker = breaker.lock().unwrap_or_else(PoisonError::into_inner);
        for report in &round.reports {
            if report.succeeded() {
                breaker.record_success(report.engine);
            } else {
                breaker.record_failure(report.engine);
            }
        }
    }

    /// Engines registered with this aggregator, in registration order.
    pub fn engines(&self) -> Vec<EngineId> {
        self.adapters.iter().map(|a| a.id()).collect()
    }

    /// Circuit state per engine seen so far. Empty when the breaker is off.
    pub fn engine_health(&self) -> Vec<(EngineId, CircuitState, u32)> {
        self.breaker.as_ref().map_or_else(Vec::new, |b| {
            b.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .health_report()
        })
    }

    /// Evict cached answers whose query contains `pattern`.
    pub async fn invalidate_by_pattern(&self, pattern: &str) -> usize {
        self.cache.invalidate_by_pattern(pattern).await
    }

    /// Evict stale cached answers now.
    pub async fn cleanup_expired(&self) -> usize {
        self.cache.cleanup_expired().await
    }

    /// Cache occupancy and hit rate.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Sweep expired cache entries every `every` in a background task.
    ///
    /// The task holds only a weak reference and ends once the aggregator is
    /// dropped. Must be called from within a Tokio runtime.
    pub fn spawn_cleanup(self: &Arc<Self>, every: Duration) -> tokio::task::JoinHandle<()> {
        let weak = Arc::downgrade(self);
        let every = every.max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(every);
            // The first tick completes immediately.
            tick.tick().await;
            loop {
                tick.tick().await;
                let Some(aggregator) = weak.upgrade() else {
                    tracing::debug!("aggregator dropped, cache sweeper exiting");
                    break;
                };
                let evicted = aggregator.cleanup_expired().await;
                tracing::trace!(evicted, "periodic cache sweep");
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Failing(EngineId);

    #[async_trait]
    impl EngineAdapter for Failing {
        fn id(&self) -> EngineId {
            self.0
        }

        async fn search(&self, _query: &str) -> Result<Vec<SearchResult>, SearchError> {
            Err(SearchError::engine(self.0, "HTTP 503"))
        }
    }

    fn cache() -> Arc<ResultCache> {
        Arc::new(ResultCache::new(16))
    }

    #[test]
    fn new_rejects_empty_adapter_set() {
        let err = Aggregator::new(vec![], cache(), &SearchConfig::default()).unwrap_err();
        assert!(matches!(err, SearchError::Config(_)));
    }

    #[test]
    fn new_rejects_zero_timeout() {
        let config = SearchConfig {
            per_adapter_timeout_secs: 0,
            ..Default::default()
        };
        let adapters: Vec<Arc<dyn EngineAdapter>> = vec![Arc::new(Failing(EngineId::Bing))];
        assert!(Aggregator::new(adapters, cache(), &config).is_err());
    }

    #[test]
    fn from_config_registers_enabled_engines() {
        let config = SearchConfig {
            enabled_adapters: vec![EngineId::Mojeek, EngineId::Startpage],
            ..Default::default()
        };
        let aggregator = Aggregator::from_config(&config).expect("aggregator");
        assert_eq!(
            aggregator.engines(),
            vec![EngineId::Mojeek, EngineId::Startpage]
        );
    }

    #[tokio::test]
    async fn empty_query_returns_nothing() {
        let adapters: Vec<Arc<dyn EngineAdapter>> = vec![Arc::new(Failing(EngineId::Bing))];
        let aggregator = Aggregator::new(adapters, cache(), &SearchConfig::default()).expect("agg");
        assert!(aggregator.search("   ").await.is_empty());
        assert!(aggregator.engine_health().is_empty());
    }

    #[tokio::test]
    async fn all_failures_are_not_cached() {
        let adapters: Vec<Arc<dyn EngineAdapter>> = vec![Arc::new(Failing(EngineId::Bing))];
        let aggregator = Aggregator::new(adapters, cache(), &SearchConfig::default()).expect("agg");
        assert!(aggregator.search("bitcoin price").await.is_empty());
        assert_eq!(aggregator.cache_stats().entries, 0);
    }

    #[tokio::test]
    async fn breaker_tracks_failures() {
        let config = SearchConfig {
            circuit_breaker: crate::circuit_breaker::CircuitBreakerConfig {
                failure_threshold: 2,
                cooldown_secs: 600,
            },
            ..Default::default()
        };
        let adapters: Vec<Arc<dyn EngineAdapter>> = vec![Arc::new(Failing(EngineId::Yep))];
        let aggregator = Aggregator::new(adapters, cache(), &config).expect("agg");
        aggregator.search("volcano").await;
        aggregator.search("volcano").await;
        assert_eq!(
            aggregator.engine_health(),
            vec![(EngineId::Yep, CircuitState::Open, 2)]
        );
    }
}
