//! Bing search engine, Microsoft's index.
//!
//! Scrapes the regular results page. Organic results live in `li.b_algo`
//! containers; the caption markup has moved around over the years, so three
//! layouts are tried. Result links are usually `/ck/a` click-tracking
//! redirects carrying the target as base64url in `u`; they are unwrapped so
//! deduplication sees the real destination.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use url::Url;

use super::strategy::{self, SelectorStrategy};
use super::AdapterContext;
use crate::engine::EngineAdapter;
use crate::error::SearchError;
use crate::http;
use crate::types::{EngineId, SearchResult};

const BING_BASE_URL: &str = "https://www.bing.com";

const STRATEGIES: &[SelectorStrategy] = &[
    SelectorStrategy::new("b_algo", "li.b_algo", "h2", ".b_caption p, .b_lineclamp2"),
    SelectorStrategy::new("b_algo-caption", "li.b_algo", "h2 a", "div.b_caption"),
    SelectorStrategy::new("b_title", "li.b_algo", "div.b_title a", "p"),
];

/// Bing HTML search scraper.
pub struct BingAdapter {
    ctx: AdapterContext,
    base_url: String,
}

impl BingAdapter {
    /// Adapter against the public Bing site.
    pub fn new(ctx: AdapterContext) -> Self {
        Self {
            ctx,
            base_url: BING_BASE_URL.to_owned(),
        }
    }

    /// Point the adapter at another host (mirrors, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }
}

#[async_trait]
impl EngineAdapter for BingAdapter {
    fn id(&self) -> EngineId {
        EngineId::Bing
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        tracing::trace!(query, "Bing search");

        let safesearch_val = if self.ctx.config.safe_search {
            "Strict"
        } else {
            "Off"
        };
        let request = self
            .ctx
            .get(&format!("{}/search", self.base_url))
            .query(&[
                ("q", query),
                ("setlang", "en"),
                ("safeSearch", safesearch_val),
            ])
            .header(reqwest::header::ACCEPT, "text/html,application/xhtml+xml");

        let html = http::fetch_text(request, EngineId::Bing).await?;
        Ok(parse_bing_html(&html, self.ctx.max_results()))
    }
}

/// Parse a Bing results page.
pub(crate) fn parse_bing_html(html: &str, max_results: usize) -> Vec<SearchResult> {
    strategy::extract_first(
        html,
        STRATEGIES,
        EngineId::Bing,
        max_results,
        extract_url,
    )
}

/// Resolve a result href to its destination.
///
/// Plain absolute links pass through. `bing.com/ck/a` redirects are decoded
/// from their `u=a1<base64url>` parameter; a redirect that cannot be decoded
/// is dropped rather than kept as a tracking link.
pub(crate) fn extract_url(href: &str) -> Option<String> {
    let absolute = if href.starts_with("/ck/a") {
        format!("{BING_BASE_URL}{href}")
    } else {
        strategy::absolute_http(href)?
    };

    let parsed = Url::parse(&absolute).ok()?;
    let is_bing = parsed
        .host_str()
        .is_some_and(|h| h == "bing.com" || h.ends_with(".bing.com"));
    if !(is_bing && parsed.path() == "/ck/a") {
        return Some(absolute);
    }

    let encoded = parsed
        .query_pairs()
        .find(|(k, _)| k == "u")
        .map(|(_, v)| v.into_owned())?;
    let payload = encoded.strip_prefix("a1")?.trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let target = String::from_utf8(bytes).ok()?;
    strategy::absolute_http(&target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfig;

    const MOCK_BING_HTML: &str = r#"<!DOCTYPE html>
<html>
<body>
<ol id="b_results">
<li class="b_algo">
  <h2><a href="https://www.rust-lang.org/" h="ID=SERP">Rust Programming Language</a></h2>
  <div class="b_caption"><p>A language empowering everyone to build reliable and efficient software.</p></div>
</li>
<li class="b_algo">
  <h2><a href="https://doc.rust-lang.org/book/" h="ID=SERP">The Rust Programming Language Book</a></h2>
  <div class="b_caption"><p>An introductory book about Rust.</p></div>
</li>
<li class="b_algo">
  <h2><a href="https://en.wikipedia.org/wiki/Rust_(programming_language)" h="ID=SERP">Rust (programming language) - Wikipedia</a></h2>
  <div class="b_caption"><p>Rust is a multi-paradigm programming language.</p></div>
</li>
</ol>
</body>
</html>"#;

    #[test]
    fn parse_mock_html_returns_results() {
        let results = parse_bing_html(MOCK_BING_HTML, 10);
        assert_eq!(results.len(), 3);

        assert_eq!(results[0].title, "Rust Programming Language");
        assert_eq!(results[0].url, "https://www.rust-lang.org/");
        assert!(results[0]
            .snippet
            .contains("reliable and efficient software"));
        assert_eq!(results[0].source, "Bing");
        assert_eq!(results[0].rank, 1);

        assert_eq!(results[1].url, "https://doc.rust-lang.org/book/");
        assert!(results[2].url.contains("wikipedia.org"));
        assert_eq!(results[2].rank, 3);
    }

    #[test]
    fn parse_respects_max_results() {
        assert_eq!(parse_bing_html(MOCK_BING_HTML, 2).len(), 2);
    }

    #[test]
    fn parse_empty_html_returns_empty() {
        assert!(parse_bing_html("<html><body></body></html>", 10).is_empty());
    }

    #[test]
    fn parse_title_div_layout() {
        let html = r#"<ol><li class="b_algo"><div class="b_title"><a href="https://tokio.rs/">Tokio</a></div><p>An async runtime.</p></li></ol>"#;
        let results = parse_bing_html(html, 10);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].url, "https://tokio.rs/");
        assert_eq!(results[0].snippet, "An async runtime.");
    }

    const CK_REDIRECT_HTML: &str = r#"<ol id="b_results">
<li class="b_algo"><h2><a href="https://www.bing.com/ck/a?!&amp;&amp;p=abc&amp;u=a1aHR0cHM6Ly93d3cucnVzdC1sYW5nLm9yZy8&amp;ntb=1">Rust</a></h2><div class="b_caption"><p>Language.</p></div></li>
<li class="b_algo"><h2><a href="https://www.bing.com/ck/a?!&amp;&amp;p=def&amp;u=a1aHR0cHM6Ly9kb2MucnVzdC1sYW5nLm9yZy9ib29rLw&amp;ntb=1">The Book</a></h2><div class="b_caption"><p>Book.</p></div></li>
<li class="b_algo"><h2><a href="/ck/a?!&amp;&amp;p=ghi&amp;u=a1aHR0cHM6Ly90b2tpby5ycy8&amp;ntb=1">Tokio</a></h2><div class="b_caption"><p>Runtime.</p></div></li>
<li class="b_algo"><h2><a href="https://www.bing.com/ck/a?!&amp;&amp;p=jkl&amp;u=a1%%%notbase64&amp;ntb=1">Broken</a></h2><div class="b_caption"><p>Dropped.</p></div></li>
</ol>"#;

    #[test]
    fn ck_redirects_resolve_to_destinations() {
        let results = parse_bing_html(CK_REDIRECT_HTML, 10);
        let urls: Vec<_> = results.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://www.rust-lang.org/",
                "https://doc.rust-lang.org/book/",
                "https://tokio.rs/",
            ]
        );
        assert_eq!(results[2].rank, 3);
    }

    #[test]
    fn ck_redirects_survive_cross_result_dedup() {
        let results = parse_bing_html(CK_REDIRECT_HTML, 10);
        let merged = crate::orchestrator::dedup::deduplicate(results);
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn extract_url_handles_plain_and_undecodable_links() {
        assert_eq!(
            extract_url("https://serde.rs/").as_deref(),
            Some("https://serde.rs/")
        );
        assert_eq!(extract_url("https://www.bing.com/ck/a?p=x"), None);
        assert_eq!(extract_url("https://www.bing.com/ck/a?u=zzaHR0cHM6Ly90b2tpby5ycy8"), None);
        assert_eq!(extract_url("javascript:void(0)"), None);
        assert_eq!(
            extract_url("https://www.bing.com/search?q=rust").as_deref(),
            Some("https://www.bing.com/search?q=rust")
        );
    }

    #[test]
    fn adapter_id_is_bing() {
        let ctx = AdapterContext::new(&SearchConfig::default()).expect("ctx");
        assert_eq!(BingAdapter::new(ctx).id(), EngineId::Bing);
    }

    #[test]
    fn is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BingAdapter>();
    }

    #[tokio::test]
    #[ignore] // Live test; run with `cargo test -- --ignored`
    async fn live_bing_search() {
        let ctx = AdapterContext::new(&SearchConfig::default()).expect("ctx");
        let results = BingAdapter::new(ctx)
            .search("rust programming")
            .await
            .expect("live search should work");
        assert!(!results.is_empty());
    }
}
