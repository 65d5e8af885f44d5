//! Yep, the Ahrefs search engine.
//!
//! Yep renders most of its page client-side, but the server response still
//! carries result markup. Only absolute `http(s)` links are kept; anything
//! else is internal navigation.

use async_trait::async_trait;

use super::strategy::{self, SelectorStrategy};
use super::AdapterContext;
use crate::engine::EngineAdapter;
use crate::error::SearchError;
use crate::http;
use crate::types::{EngineId, SearchResult};

const YEP_BASE_URL: &str = "https://yep.com";

const STRATEGIES: &[SelectorStrategy] = &[
    SelectorStrategy::new("div.result", "div.result", "a.result-link", "p.snippet"),
    SelectorStrategy::new("search-result", "div.search-result", "h3 a", "p.snippet, p"),
    SelectorStrategy::new("article", "article", "h3 a, a[href]", "p"),
    SelectorStrategy::new(
        "data-testid",
        r#"div[data-testid*="result"]"#,
        "a[href]",
        "div.description, p",
    ),
];

/// Yep HTML search scraper.
pub struct YepAdapter {
    ctx: AdapterContext,
    base_url: String,
}

impl YepAdapter {
    /// Adapter against the public Yep site.
    pub fn new(ctx: AdapterContext) -> Self {
        Self {
            ctx,
            base_url: YEP_BASE_URL.to_owned(),
        }
    }

    /// Point the adapter at another host (test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }
}

#[async_trait]
impl EngineAdapter for YepAdapter {
    fn id(&self) -> EngineId {
        EngineId::Yep
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        tracing::trace!(query, "Yep search");

        let request = self
            .ctx
            .get(&format!("{}/web", self.base_url))
            .query(&[("q", query)]);

        let html = http::fetch_text(request, EngineId::Yep).await?;
        Ok(parse_yep_html(&html, self.ctx.max_results()))
    }
}

/// Parse a Yep results page.
pub(crate) fn parse_yep_html(html: &str, max_results: usize) -> Vec<SearchResult> {
    strategy::extract_first(
        html,
        STRATEGIES,
        EngineId::Yep,
        max_results,
        strategy::absolute_http,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_primary_layout() {
        let html = r#"<div class="result"><a class="result-link" href="https://ahrefs.com/">Ahrefs</a><p class="snippet">SEO tools.</p></div>
<div class="result"><a class="result-link" href="https://yep.com/about">About Yep</a><p class="snippet">Search engine.</p></div>"#;
        let results = parse_yep_html(html, 10);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Ahrefs");
        assert_eq!(results[0].source, "Yep");
        assert_eq!(results[1].url, "https://yep.com/about");
    }

    #[test]
    fn parse_data_testid_layout() {
        let html = r#"<div data-testid="organic-result-1"><a href="https://www.rust-lang.org/">Rust</a><div class="description">Fast and safe.</div></div>
<div data-testid="organic-result-2"><a href="/settings">Settings</a></div>"#;
        let results = parse_yep_html(html, 10);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].url, "https://www.rust-lang.org/");
        assert_eq!(results[0].snippet, "Fast and safe.");
    }

    #[test]
    fn parse_script_only_page_returns_empty() {
        let html = r#"<html><body><div id="root"></div><script>window.__DATA__={}</script></body></html>"#;
        assert!(parse_yep_html(html, 10).is_empty());
    }

    #[test]
    fn is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<YepAdapter>();
    }

    #[tokio::test]
    #[ignore] // Live test; run with `cargo test -- --ignored`
    async fn live_yep_search() {
        let ctx = AdapterContext::new(&crate::config::SearchConfig::default()).expect("ctx");
        let results = YepAdapter::new(ctx)
            .search("rust programming")
            .await
            .expect("live search should work");
        assert!(!results.is_empty());
    }
}
