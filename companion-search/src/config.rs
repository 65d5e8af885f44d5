//! Search configuration with sensible defaults.
//!
//! [`SearchConfig`] controls which adapters are registered, the per-adapter
//! and per-request deadlines, Searx instance selection, cache sizing and the
//! circuit breaker. Every field has a default so a partial `[search]` table in
//! a TOML file is enough.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::circuit_breaker::CircuitBreakerConfig;
use crate::error::SearchError;
use crate::types::EngineId;

/// Known-good public SearXNG mirrors, in priority order.
pub const DEFAULT_SEARX_INSTANCES: &[&str] = &[
    "https://searx.be",
    "https://search.sapti.me",
    "https://searx.xyz",
    "https://searx.prvcy.eu",
    "https://search.mdosch.de",
    "https://searx.work",
    "https://searx.tiekoetter.com",
];

/// Configuration for the aggregator and its engine adapters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Deadline applied to each adapter task individually, in seconds.
    pub per_adapter_timeout_secs: u64,
    /// Timeout of a single HTTP attempt inside an adapter, in seconds.
    /// Must not exceed `per_adapter_timeout_secs`.
    pub request_timeout_secs: u64,
    /// How many entries of `searx_instances` the Searx adapter tries.
    pub searx_instance_limit: usize,
    /// SearXNG base URLs in priority order.
    pub searx_instances: Vec<String>,
    /// Engines registered with the aggregator. Queried concurrently.
    pub enabled_adapters: Vec<EngineId>,
    /// Maximum results kept from each engine.
    pub max_results_per_engine: usize,
    /// Whether to request safe search filtering from engines that support it.
    pub safe_search: bool,
    /// Custom User-Agent string. If `None`, rotates through a built-in list
    /// of realistic browser User-Agents.
    pub user_agent: Option<String>,
    /// Upper bound on cached result sets.
    pub cache_max_entries: u64,
    /// Interval of the background expired-entry sweep, in seconds.
    pub cleanup_interval_secs: u64,
    /// Per-engine circuit breaker. A `failure_threshold` of 0 disables it.
    pub circuit_breaker: CircuitBreakerConfig,
    /// Minimum spacing between requests to the same engine.
    pub rate_limits: RateLimitConfig,
}

/// Minimum milliseconds between two searches sent to the same engine.
/// 0 disables throttling for that engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub bing_ms: u64,
    pub searx_ms: u64,
    pub duckduckgo_ms: u64,
    pub qwant_ms: u64,
    pub mojeek_ms: u64,
    pub yep_ms: u64,
    pub startpage_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            bing_ms: 500,
            searx_ms: 300,
            duckduckgo_ms: 500,
            qwant_ms: 500,
            mojeek_ms: 800,
            yep_ms: 800,
            startpage_ms: 1_000,
        }
    }
}

impl RateLimitConfig {
    /// No throttling for any engine.
    pub fn disabled() -> Self {
        Self {
            bing_ms: 0,
            searx_ms: 0,
            duckduckgo_ms: 0,
            qwant_ms: 0,
            mojeek_ms: 0,
            yep_ms: 0,
            startpage_ms: 0,
        }
    }

    /// Minimum interval for `engine`.
    pub fn interval(&self, engine: EngineId) -> Duration {
        let ms = match engine {
            EngineId::Bing => self.bing_ms,
            EngineId::Searx => self.searx_ms,
            EngineId::DuckDuckGo => self.duckduckgo_ms,
            EngineId::Qwant => self.qwant_ms,
            EngineId::Mojeek => self.mojeek_ms,
            EngineId::Yep => self.yep_ms,
            EngineId::Startpage => self.startpage_ms,
        };
        Duration::from_millis(ms)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            per_adapter_timeout_secs: 15,
            request_timeout_secs: 8,
            searx_instance_limit: 3,
            searx_instances: DEFAULT_SEARX_INSTANCES
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
            enabled_adapters: EngineId::all().to_vec(),
            max_results_per_engine: 10,
            safe_search: true,
            user_agent: None,
            cache_max_entries: 1000,
            cleanup_interval_secs: 300,
            circuit_breaker: CircuitBreakerConfig::default(),
            rate_limits: RateLimitConfig::default(),
        }
    }
}

impl SearchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - both timeouts are greater than 0
    /// - a single HTTP attempt is not allowed to outlive its adapter's deadline
    /// - at least one adapter is enabled
    /// - Searx is given at least one instance when enabled
    /// - result and cache limits are greater than 0
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.per_adapter_timeout_secs == 0 {
            return Err(SearchError::Config(
                "per_adapter_timeout_secs must be greater than 0".into(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(SearchError::Config(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }
        if self.request_timeout_secs > self.per_adapter_timeout_secs {
            return Err(SearchError::Config(
                "request_timeout_secs must be <= per_adapter_timeout_secs".into(),
            ));
        }
        if self.enabled_adapters.is_empty() {
            return Err(SearchError::Config(
                "at least one adapter must be enabled".into(),
            ));
        }
        if self.enabled_adapters.contains(&EngineId::Searx)
            && (self.searx_instance_limit == 0 || self.searx_instances.is_empty())
        {
            return Err(SearchError::Config(
                "searx needs at least one instance (check searx_instance_limit)".into(),
            ));
        }
        if self.max_results_per_engine == 0 {
            return Err(SearchError::Config(
                "max_results_per_engine must be greater than 0".into(),
            ));
        }
        if self.cache_max_entries == 0 {
            return Err(SearchError::Config(
                "cache_max_entries must be greater than 0".into(),
            ));
        }
        if let Some(engine) = self.unique_adapters().into_iter().find(|e| {
            self.rate_limits.interval(*e) >= Duration::from_secs(self.per_adapter_timeout_secs)
        }) {
            return Err(SearchError::Config(format!(
                "rate limit for {engine} must be shorter than per_adapter_timeout_secs"
            )));
        }
        Ok(())
    }

    /// Searx instances actually tried, bounded by `searx_instance_limit`.
    pub fn searx_candidates(&self) -> Vec<String> {
        self.searx_instances
            .iter()
            .take(self.searx_instance_limit)
            .map(|s| s.trim_end_matches('/').to_owned())
            .collect()
    }

    /// Enabled adapters with duplicates removed, in first-listed order.
    pub fn unique_adapters(&self) -> Vec<EngineId> {
        let mut seen = Vec::with_capacity(self.enabled_adapters.len());
        for engine in &self.enabled_adapters {
            if !seen.contains(engine) {
                seen.push(*engine);
            }
        }
        seen
    }
}
