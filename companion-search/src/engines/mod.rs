//! Search engine adapters.
//!
//! Each module provides a struct implementing [`crate::engine::EngineAdapter`]
//! for one backend. HTML-scraping adapters describe their markup as ordered
//! [`strategy::SelectorStrategy`] lists; JSON adapters (Searx, Qwant's API)
//! decode with serde.

pub mod bing;
pub mod duckduckgo;
pub mod mojeek;
pub mod qwant;
pub mod searx;
pub mod startpage;
pub mod strategy;
pub mod throttle;
pub mod yep;

use std::sync::Arc;

use crate::config::SearchConfig;
use crate::engine::EngineAdapter;
use crate::error::SearchError;
use crate::http;
use crate::types::EngineId;

pub use bing::BingAdapter;
pub use duckduckgo::DuckDuckGoAdapter;
pub use mojeek::MojeekAdapter;
pub use qwant::QwantAdapter;
pub use searx::SearxAdapter;
pub use startpage::StartpageAdapter;
pub use throttle::Throttled;
pub use yep::YepAdapter;

/// What every adapter needs to issue requests: the shared client and the
/// configuration it was built from.
#[derive(Debug, Clone)]
pub struct AdapterContext {
    /// Shared HTTP client, already carrying the per-attempt timeout.
    pub client: reqwest::Client,
    /// Search configuration.
    pub config: Arc<SearchConfig>,
}

impl AdapterContext {
    /// Build the shared client for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the client cannot be constructed.
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        Ok(Self {
            client: http::build_client(config)?,
            config: Arc::new(config.clone()),
        })
    }

    /// GET request to `url` with browser-like headers.
    pub(crate) fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.with_headers(self.client.get(url))
    }

    /// POST request to `url` with browser-like headers.
    pub(crate) fn post(&self, url: &str) -> reqwest::RequestBuilder {
        self.with_headers(self.client.post(url))
    }

    fn with_headers(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header(reqwest::header::USER_AGENT, http::user_agent(&self.config))
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
    }

    /// Cap on results kept from one engine.
    pub(crate) fn max_results(&self) -> usize {
        self.config.max_results_per_engine
    }
}

/// Construct one adapter, spaced by its configured rate limit.
pub fn build_adapter(engine: EngineId, ctx: &AdapterContext) -> Arc<dyn EngineAdapter> {
    let interval = ctx.config.rate_limits.interval(engine);
    let adapter = build_unthrottled(engine, ctx);
    if interval.is_zero() {
        adapter
    } else {
        Arc::new(Throttled::new(adapter, interval))
    }
}

fn build_unthrottled(engine: EngineId, ctx: &AdapterContext) -> Arc<dyn EngineAdapter> {
    let ctx = ctx.clone();
    match engine {
        EngineId::Bing => Arc::new(BingAdapter::new(ctx)),
        EngineId::Searx => Arc::new(SearxAdapter::new(ctx)),
        EngineId::DuckDuckGo => Arc::new(DuckDuckGoAdapter::new(ctx)),
        EngineId::Qwant => Arc::new(QwantAdapter::new(ctx)),
        EngineId::Mojeek => Arc::new(MojeekAdapter::new(ctx)),
        EngineId::Yep => Arc::new(YepAdapter::new(ctx)),
        EngineId::Startpage => Arc::new(StartpageAdapter::new(ctx)),
    }
}

/// Construct every adapter enabled in `config`, in configuration order,
/// sharing one HTTP client.
///
/// # Errors
///
/// Returns [`SearchError::Config`] if `config` is invalid, or
/// [`SearchError::Http`] if the client cannot be built.
pub fn build_adapters(config: &SearchConfig) -> Result<Vec<Arc<dyn EngineAdapter>>, SearchError> {
    config.validate()?;
    let ctx = AdapterContext::new(config)?;
    let adapters: Vec<_> = config
        .unique_adapters()
        .into_iter()
        .map(|engine| build_adapter(engine, &ctx))
        .collect();
    tracing::debug!(count = adapters.len(), "engine adapters registered");
    Ok(adapters)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_adapters_follows_config_order() {
        let config = SearchConfig {
            enabled_adapters: vec![EngineId::Yep, EngineId::Bing, EngineId::Yep],
            ..Default::default()
        };
        let adapters = build_adapters(&config).expect("adapters");
        let ids: Vec<_> = adapters.iter().map(|a| a.id()).collect();
        assert_eq!(ids, vec![EngineId::Yep, EngineId::Bing]);
    }

    #[test]
    fn build_adapters_covers_every_engine() {
        let adapters = build_adapters(&SearchConfig::default()).expect("adapters");
        let ids: Vec<_> = adapters.iter().map(|a| a.id()).collect();
        assert_eq!(ids, EngineId::all());
    }

    #[test]
    fn build_adapters_rejects_invalid_config() {
        let config = SearchConfig {
            enabled_adapters: vec![],
            ..Default::default()
        };
        assert!(matches!(
            build_adapters(&config),
            Err(SearchError::Config(_))
        ));
    }
}
