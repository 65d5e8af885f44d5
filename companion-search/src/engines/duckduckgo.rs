//! DuckDuckGo search engine, the most scraper-friendly backend.
//!
//! Uses the HTML-only version at `https://html.duckduckgo.com/html/`
//! which requires no JavaScript and is tolerant of automated requests.

use async_trait::async_trait;
use url::Url;

use super::strategy::{self, SelectorStrategy};
use super::AdapterContext;
use crate::engine::EngineAdapter;
use crate::error::SearchError;
use crate::http;
use crate::types::{EngineId, SearchResult};

const DDG_BASE_URL: &str = "https://html.duckduckgo.com";

const STRATEGIES: &[SelectorStrategy] = &[
    SelectorStrategy::new(
        "results_links",
        ".result.results_links.results_links_deep:not(.result--ad), .web-result:not(.result--ad)",
        ".result__a",
        ".result__snippet",
    ),
    SelectorStrategy::new(
        "result__body",
        "div.result__body",
        "h2.result__title a",
        ".result__snippet",
    ),
];

/// DuckDuckGo HTML search scraper.
///
/// Sends a POST to the HTML-only endpoint and unwraps DuckDuckGo's
/// `/l/?uddg=` redirect links into the real target URLs.
pub struct DuckDuckGoAdapter {
    ctx: AdapterContext,
    base_url: String,
}

impl DuckDuckGoAdapter {
    /// Adapter against the public HTML endpoint.
    pub fn new(ctx: AdapterContext) -> Self {
        Self {
            ctx,
            base_url: DDG_BASE_URL.to_owned(),
        }
    }

    /// Point the adapter at another host (test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    /// Extract the actual URL from DuckDuckGo's redirect wrapper.
    ///
    /// DDG wraps URLs like: `//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=...`
    /// We parse out the `uddg` query parameter and URL-decode it.
    fn extract_url(href: &str) -> Option<String> {
        // Handle protocol-relative URLs
        let full_href = if href.starts_with("//") {
            format!("https:{href}")
        } else {
            href.to_string()
        };

        let parsed = Url::parse(&full_href).ok()?;

        let target = if parsed.host_str() == Some("duckduckgo.com") && parsed.path().starts_with("/l/")
        {
            parsed
                .query_pairs()
                .find(|(key, _)| key == "uddg")
                .map(|(_, value)| value.into_owned())?
        } else {
            full_href
        };
        strategy::absolute_http(&target)
    }
}

#[async_trait]
impl EngineAdapter for DuckDuckGoAdapter {
    fn id(&self) -> EngineId {
        EngineId::DuckDuckGo
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        tracing::trace!(query, "DuckDuckGo search");

        let mut params = vec![("q", query)];
        if self.ctx.config.safe_search {
            params.push(("kp", "1"));
        }

        let request = self
            .ctx
            .post(&format!("{}/html/", self.base_url))
            .form(&params);

        let html = http::fetch_text(request, EngineId::DuckDuckGo).await?;
        Ok(parse_duckduckgo_html(&html, self.ctx.max_results()))
    }
}

/// Parse a DuckDuckGo HTML results page.
pub(crate) fn parse_duckduckgo_html(html: &str, max_results: usize) -> Vec<SearchResult> {
    strategy::extract_first(
        html,
        STRATEGIES,
        EngineId::DuckDuckGo,
        max_results,
        DuckDuckGoAdapter::extract_url,
    )
}
