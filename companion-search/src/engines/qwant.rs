//! Qwant, a European engine with a public JSON API.
//!
//! The API is tried first. When it errors or returns nothing (it is rate
//! limited aggressively), the regular HTML search page is scraped instead.
//! That page is mostly client-rendered, so the scrape falls back to picking
//! outbound links with substantial anchor text.

use async_trait::async_trait;
use serde_json::Value;

use super::strategy::{self, SelectorStrategy};
use super::AdapterContext;
use crate::engine::EngineAdapter;
use crate::error::SearchError;
use crate::http;
use crate::types::{EngineId, SearchResult};

const QWANT_API_URL: &str = "https://api.qwant.com";
const QWANT_WEB_URL: &str = "https://www.qwant.com";

const STRATEGIES: &[SelectorStrategy] = &[
    SelectorStrategy::new(
        "web-result",
        r#"div[data-testid="webResult"]"#,
        "a[href]",
        r#"div[data-testid="webResult"] p, p"#,
    ),
    SelectorStrategy::new("result", "div.result", "a.result--web--link, a", "p.result--web--desc, p"),
    SelectorStrategy {
        name: "outbound-links",
        container: r#"a[href^="http"]"#,
        title: None,
        snippet: None,
        min_title_chars: 11,
    },
];

/// Qwant adapter: JSON API with an HTML scraping fallback.
pub struct QwantAdapter {
    ctx: AdapterContext,
    api_url: String,
    web_url: String,
}

impl QwantAdapter {
    /// Adapter against the public Qwant API and site.
    pub fn new(ctx: AdapterContext) -> Self {
        Self {
            ctx,
            api_url: QWANT_API_URL.to_owned(),
            web_url: QWANT_WEB_URL.to_owned(),
        }
    }

    /// Point the adapter at other hosts (test servers).
    pub fn with_base_urls(mut self, api_url: impl Into<String>, web_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_owned();
        self.web_url = web_url.into().trim_end_matches('/').to_owned();
        self
    }

    async fn search_api(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        let count = self.ctx.max_results().min(10).to_string();
        let safesearch = if self.ctx.config.safe_search { "1" } else { "0" };
        let request = self
            .ctx
            .get(&format!("{}/v3/search/web", self.api_url))
            .query(&[
                ("q", query),
                ("count", count.as_str()),
                ("locale", "en_US"),
                ("device", "desktop"),
                ("safesearch", safesearch),
            ])
            .header(reqwest::header::ACCEPT, "application/json");

        let body = http::fetch_text(request, EngineId::Qwant).await?;
        parse_qwant_json(&body, self.ctx.max_results())
    }

    async fn search_web(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        let request = self
            .ctx
            .get(&format!("{}/", self.web_url))
            .query(&[("q", query), ("t", "web")])
            .header(reqwest::header::ACCEPT, "text/html,application/xhtml+xml");

        let html = http::fetch_text(request, EngineId::Qwant).await?;
        Ok(parse_qwant_html(&html, self.ctx.max_results()))
    }
}

#[async_trait]
impl EngineAdapter for QwantAdapter {
    fn id(&self) -> EngineId {
        EngineId::Qwant
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        tracing::trace!(query, "Qwant search");

        let api_answered = match self.search_api(query).await {
            Ok(results) if !results.is_empty() => return Ok(results),
            Ok(_) => {
                tracing::debug!("Qwant API returned nothing, scraping web page");
                true
            }
            Err(e) => {
                tracing::debug!(error = %e, "Qwant API failed, scraping web page");
                false
            }
        };

        match self.search_web(query).await {
            Ok(results) => Ok(results),
            Err(_) if api_answered => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }
}

/// Decode a Qwant API body.
///
/// Accepts both the flat `data.result.items: [..]` shape and the grouped
/// `data.result.items.mainline: [{type, items: [..]}]` shape, keeping only
/// `web` groups of the latter.
pub(crate) fn parse_qwant_json(
    body: &str,
    max_results: usize,
) -> Result<Vec<SearchResult>, SearchError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| SearchError::engine(EngineId::Qwant, format!("malformed JSON: {e}")))?;

    if value.get("status").and_then(Value::as_str) == Some("error") {
        return Err(SearchError::engine(EngineId::Qwant, "API returned an error status"));
    }

    let items = &value["data"]["result"]["items"];
    let flat: Vec<&Value> = match items {
        Value::Array(list) => list.iter().collect(),
        Value::Object(_) => items["mainline"]
            .as_array()
            .map(|groups| {
                groups
                    .iter()
                    .filter(|g| g["type"].as_str() == Some("web"))
                    .filter_map(|g| g["items"].as_array())
                    .flatten()
                    .collect()
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    };

    let results = flat
        .into_iter()
        .filter_map(|item| {
            let title = item["title"].as_str()?.trim();
            let url = item["url"].as_str()?;
            if title.is_empty() || !url.starts_with("http") {
                return None;
            }
            let snippet = item["desc"].as_str().unwrap_or_default().trim();
            Some((title.to_owned(), url.to_owned(), snippet.to_owned()))
        })
        .take(max_results)
        .enumerate()
        .map(|(i, (title, url, snippet))| SearchResult {
            source: EngineId::Qwant.name().to_owned(),
            title,
            url,
            snippet,
            rank: u32::try_from(i + 1).unwrap_or(u32::MAX),
        })
        .collect();
    Ok(results)
}

/// Parse the Qwant HTML search page, skipping links back to Qwant itself.
pub(crate) fn parse_qwant_html(html: &str, max_results: usize) -> Vec<SearchResult> {
    strategy::extract_first(html, STRATEGIES, EngineId::Qwant, max_results, |href| {
        let url = strategy::absolute_http(href)?;
        let host = url::Url::parse(&url).ok()?.host_str()?.to_ascii_lowercase();
        (!(host == "qwant.com" || host.ends_with(".qwant.com"))).then_some(url)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_flat_api_items() {
        let body = r#"{"status":"success","data":{"result":{"items":[
            {"title":"Rust","url":"https://www.rust-lang.org/","desc":"A language."},
            {"title":"Cargo","url":"https://doc.rust-lang.org/cargo/"}
        ]}}}"#;
        let results = parse_qwant_json(body, 10).expect("parse");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].source, "Qwant");
        assert_eq!(results[0].snippet, "A language.");
        assert_eq!(results[1].rank, 2);
    }

    #[test]
    fn parse_mainline_api_items_keeps_web_groups() {
        let body = r#"{"status":"success","data":{"result":{"items":{"mainline":[
            {"type":"ads","items":[{"title":"Ad","url":"https://ad.example/"}]},
            {"type":"web","items":[{"title":"Tokio","url":"https://tokio.rs/","desc":"Async runtime."}]}
        ]}}}}"#;
        let results = parse_qwant_json(body, 10).expect("parse");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].url, "https://tokio.rs/");
    }

    #[test]
    fn parse_error_status_is_engine_error() {
        let body = r#"{"status":"error","data":{"error_code":24}}"#;
        assert!(parse_qwant_json(body, 10).is_err());
    }

    #[test]
    fn parse_missing_items_is_empty() {
        let results = parse_qwant_json(r#"{"status":"success","data":{}}"#, 10).expect("parse");
        assert!(results.is_empty());
    }

    #[test]
    fn parse_html_fallback_skips_qwant_links_and_short_titles() {
        let html = r#"<html><body>
<a href="https://www.qwant.com/maps">Qwant Maps for everyone</a>
<a href="https://short.example/">Short</a>
<a href="https://www.rust-lang.org/">Rust Programming Language</a>
<a href="/settings">Settings and preferences</a>
</body></html>"#;
        let results = parse_qwant_html(html, 10);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].url, "https://www.rust-lang.org/");
        assert_eq!(results[0].title, "Rust Programming Language");
    }

    #[test]
    fn is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<QwantAdapter>();
    }
}
