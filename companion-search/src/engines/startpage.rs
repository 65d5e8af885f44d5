//! Startpage search engine, a privacy proxy for Google results.
//!
//! Uses a GET request to `https://www.startpage.com/do/search`. Startpage
//! rotates its class names regularly; the strategies below cover the
//! current `w-gl` layout and the older plain layouts.

use async_trait::async_trait;

use super::strategy::{self, SelectorStrategy};
use super::AdapterContext;
use crate::engine::EngineAdapter;
use crate::error::SearchError;
use crate::http;
use crate::types::{EngineId, SearchResult};

const STARTPAGE_BASE_URL: &str = "https://www.startpage.com";

const STRATEGIES: &[SelectorStrategy] = &[
    SelectorStrategy::new(
        "w-gl",
        ".w-gl__result",
        ".w-gl__result-title",
        ".w-gl__description",
    ),
    SelectorStrategy::new("w-gl-h3", "div.w-gl__result", "h3", "p.w-gl__description"),
    SelectorStrategy::new(
        "result",
        "div.result",
        "a.result-title, a.result-link",
        "p.description",
    ),
];

/// Startpage HTML search scraper.
pub struct StartpageAdapter {
    ctx: AdapterContext,
    base_url: String,
}

impl StartpageAdapter {
    /// Adapter against the public Startpage site.
    pub fn new(ctx: AdapterContext) -> Self {
        Self {
            ctx,
            base_url: STARTPAGE_BASE_URL.to_owned(),
        }
    }

    /// Point the adapter at another host (test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }
}

#[async_trait]
impl EngineAdapter for StartpageAdapter {
    fn id(&self) -> EngineId {
        EngineId::Startpage
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        tracing::trace!(query, "Startpage search");

        let mut params = vec![("q", query), ("cat", "web")];
        if !self.ctx.config.safe_search {
            params.push(("qadf", "none"));
        }

        let request = self
            .ctx
            .get(&format!("{}/do/search", self.base_url))
            .query(&params)
            .header(reqwest::header::ACCEPT, "text/html,application/xhtml+xml");

        let html = http::fetch_text(request, EngineId::Startpage).await?;
        Ok(parse_startpage_html(&html, self.ctx.max_results()))
    }
}

/// Parse a Startpage results page.
pub(crate) fn parse_startpage_html(html: &str, max_results: usize) -> Vec<SearchResult> {
    strategy::extract_first(
        html,
        STRATEGIES,
        EngineId::Startpage,
        max_results,
        strategy::absolute_http,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOCK_STARTPAGE_HTML: &str = r#"<!DOCTYPE html>
<html>
<body>
<div class="w-gl__result">
    <div class="w-gl__result-title">
        <a href="https://www.rust-lang.org/">
            Rust Programming Language
        </a>
    </div>
    <div class="w-gl__description">
        A language empowering everyone to build reliable and efficient software.
    </div>
</div>
<div class="w-gl__result">
    <div class="w-gl__result-title">
        <a href="https://doc.rust-lang.org/book/">
            The Rust Programming Language Book
        </a>
    </div>
    <div class="w-gl__description">
        An introductory book about Rust. The Rust Programming Language.
    </div>
</div>
<div class="w-gl__result">
    <div class="w-gl__result-title">
        <a href="https://en.wikipedia.org/wiki/Rust_(programming_language)">
            Rust (programming language) - Wikipedia
        </a>
    </div>
    <div class="w-gl__description">
        Rust is a multi-paradigm, general-purpose programming language.
    </div>
</div>
</body>
</html>"#;

    #[test]
    fn parse_mock_html_returns_results() {
        let results = parse_startpage_html(MOCK_STARTPAGE_HTML, 10);
        assert_eq!(results.len(), 3);

        assert_eq!(results[0].title, "Rust Programming Language");
        assert_eq!(results[0].url, "https://www.rust-lang.org/");
        assert!(results[0].snippet.contains("reliable and efficient"));
        assert_eq!(results[0].source, "Startpage");

        assert_eq!(results[1].url, "https://doc.rust-lang.org/book/");
        assert!(results[2].url.contains("wikipedia.org"));
    }

    #[test]
    fn parse_h3_layout_takes_link_from_container() {
        let html = r#"<div class="w-gl__result"><a class="w-gl__result-url" href="https://crates.io/">crates.io</a><h3>The Rust community's crate registry</h3><p class="w-gl__description">Find crates.</p></div>"#;
        let results = parse_startpage_html(html, 10);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "The Rust community's crate registry");
        assert_eq!(results[0].url, "https://crates.io/");
        assert_eq!(results[0].snippet, "Find crates.");
    }

    #[test]
    fn parse_respects_max_results() {
        assert_eq!(parse_startpage_html(MOCK_STARTPAGE_HTML, 2).len(), 2);
    }

    #[test]
    fn parse_empty_html_returns_empty() {
        assert!(parse_startpage_html("<html><body></body></html>", 10).is_empty());
    }

    #[test]
    fn is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StartpageAdapter>();
    }

    #[tokio::test]
    #[ignore] // Live test; run with `cargo test -- --ignored`
    async fn live_startpage_search() {
        let ctx = AdapterContext::new(&crate::config::SearchConfig::default()).expect("ctx");
        let results = StartpageAdapter::new(ctx)
            .search("rust programming")
            .await
            .expect("live search should work");
        assert!(!results.is_empty());
    }
}
