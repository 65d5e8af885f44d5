//! Mojeek, an independent crawler-based index.
//!
//! Mojeek has shipped several result layouts; each strategy below targets
//! one of them.

use async_trait::async_trait;

use super::strategy::{self, SelectorStrategy};
use super::AdapterContext;
use crate::engine::EngineAdapter;
use crate::error::SearchError;
use crate::http;
use crate::types::{EngineId, SearchResult};

const MOJEEK_BASE_URL: &str = "https://www.mojeek.com";

const STRATEGIES: &[SelectorStrategy] = &[
    SelectorStrategy::new("li.result", "li.result", "a.title", "p.s"),
    SelectorStrategy::new("results-standard", "div.results-standard li", "h2 a", "p.s"),
    SelectorStrategy::new("article", "article", "h2", "p.snippet, p"),
    SelectorStrategy::new("result-item", "li.result-item", "a", "p.snippet, p"),
];

/// Mojeek HTML search scraper.
pub struct MojeekAdapter {
    ctx: AdapterContext,
    base_url: String,
}

impl MojeekAdapter {
    /// Adapter against the public Mojeek site.
    pub fn new(ctx: AdapterContext) -> Self {
        Self {
            ctx,
            base_url: MOJEEK_BASE_URL.to_owned(),
        }
    }

    /// Point the adapter at another host (test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }
}

#[async_trait]
impl EngineAdapter for MojeekAdapter {
    fn id(&self) -> EngineId {
        EngineId::Mojeek
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        tracing::trace!(query, "Mojeek search");

        let safe = if self.ctx.config.safe_search { "1" } else { "0" };
        let request = self
            .ctx
            .get(&format!("{}/search", self.base_url))
            .query(&[("q", query), ("safe", safe)]);

        let html = http::fetch_text(request, EngineId::Mojeek).await?;
        Ok(parse_mojeek_html(&html, self.ctx.max_results()))
    }
}

/// Parse a Mojeek results page.
pub(crate) fn parse_mojeek_html(html: &str, max_results: usize) -> Vec<SearchResult> {
    strategy::extract_first(
        html,
        STRATEGIES,
        EngineId::Mojeek,
        max_results,
        strategy::absolute_http,
    )
}
