//! SearXNG meta-search over public instances.
//!
//! Public instances come and go, and many disable some upstream engines. The
//! adapter walks the configured instances in priority order and, for each,
//! asks for progressively smaller engine combinations, returning the first
//! attempt that yields any result. Every attempt is bounded by the client's
//! per-request timeout. An instance that cannot be reached or times out is
//! abandoned after its first attempt, so one dead instance costs at most one
//! timeout and the next mirror still fits within the adapter's deadline.

use async_trait::async_trait;
use serde::Deserialize;

use super::AdapterContext;
use crate::engine::EngineAdapter;
use crate::error::SearchError;
use crate::http;
use crate::types::{EngineId, SearchResult};

/// Upstream engine sets requested from each instance, richest first.
pub const ENGINE_COMBINATIONS: &[&str] = &[
    "google,bing,duckduckgo,qwant,mojeek,brave,yahoo",
    "google,bing,duckduckgo,qwant",
    "google,bing,duckduckgo",
];

/// SearXNG JSON response. Only the fields we read.
#[derive(Debug, Deserialize)]
struct SearxResponse {
    #[serde(default)]
    results: Vec<SearxItem>,
}

#[derive(Debug, Deserialize)]
struct SearxItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

/// Meta-adapter over SearXNG instances.
pub struct SearxAdapter {
    ctx: AdapterContext,
    instances: Vec<String>,
}

impl SearxAdapter {
    /// Adapter over the configured instances, bounded by
    /// `searx_instance_limit`.
    pub fn new(ctx: AdapterContext) -> Self {
        let instances = ctx.config.searx_candidates();
        Self { ctx, instances }
    }

    /// Instances this adapter will try, in order.
    pub fn instances(&self) -> &[String] {
        &self.instances
    }

    async fn attempt(&self, instance: &str, engines: &str, query: &str) -> Attempt {
        let safesearch = if self.ctx.config.safe_search { "1" } else { "0" };
        let request = self
            .ctx
            .get(&format!("{instance}/search"))
            .query(&[
                ("q", query),
                ("format", "json"),
                ("engines", engines),
                ("safesearch", safesearch),
                ("categories", "general"),
            ])
            .header(reqwest::header::ACCEPT, "application/json");

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                return Attempt::Unreachable(SearchError::engine(
                    EngineId::Searx,
                    format!("request failed: {e}"),
                ));
            }
        };
        let response = match response.error_for_status() {
            Ok(response) => response,
            Err(e) => {
                return Attempt::Rejected(SearchError::engine(
                    EngineId::Searx,
                    format!("HTTP error: {e}"),
                ));
            }
        };
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Attempt::Unreachable(SearchError::engine(
                    EngineId::Searx,
                    format!("response read failed: {e}"),
                ));
            }
        };
        match parse_searx_json(&body, self.ctx.max_results()) {
            Ok(results) => Attempt::Answered(results),
            Err(e) => Attempt::Rejected(e),
        }
    }
}

/// Outcome of one request to one instance.
enum Attempt {
    /// The instance answered, possibly with nothing.
    Answered(Vec<SearchResult>),
    /// The instance responded but refused or garbled this engine set;
    /// a smaller combination may still work.
    Rejected(SearchError),
    /// Connection failure or timeout. The instance is skipped entirely.
    Unreachable(SearchError),
}

#[async_trait]
impl EngineAdapter for SearxAdapter {
    fn id(&self) -> EngineId {
        EngineId::Searx
    }

    /// Returns the first non-empty attempt. If at least one attempt answered
    /// but all answers were empty, that is a legitimate empty result; if every
    /// attempt failed, the last failure is returned.
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        tracing::trace!(query, "Searx search");

        let mut answered = false;
        let mut last_error = None;

        'instances: for instance in &self.instances {
            for engines in ENGINE_COMBINATIONS {
                match self.attempt(instance, engines, query).await {
                    Attempt::Answered(results) if !results.is_empty() => {
                        tracing::debug!(instance = %instance, engines, count = results.len(), "Searx answered");
                        return Ok(results);
                    }
                    Attempt::Answered(_) => {
                        answered = true;
                        tracing::trace!(instance = %instance, engines, "Searx returned nothing");
                    }
                    Attempt::Rejected(e) => {
                        tracing::debug!(instance = %instance, engines, error = %e, "Searx attempt failed");
                        last_error = Some(e);
                    }
                    Attempt::Unreachable(e) => {
                        tracing::debug!(instance = %instance, error = %e, "Searx instance unreachable, skipping");
                        last_error = Some(e);
                        continue 'instances;
                    }
                }
            }
        }

        match last_error {
            Some(e) if !answered => Err(e),
            _ => Ok(Vec::new()),
        }
    }
}

/// Decode a SearXNG JSON body into results tagged as Searx.
pub(crate) fn parse_searx_json(
    body: &str,
    max_results: usize,
) -> Result<Vec<SearchResult>, SearchError> {
    let response: SearxResponse = serde_json::from_str(body)
        .map_err(|e| SearchError::engine(EngineId::Searx, format!("malformed JSON: {e}")))?;

    let results = response
        .results
        .into_iter()
        .filter(|item| !item.title.trim().is_empty() && item.url.starts_with("http"))
        .take(max_results)
        .enumerate()
        .map(|(i, item)| SearchResult {
            source: EngineId::Searx.name().to_owned(),
            title: item.title.trim().to_owned(),
            url: item.url,
            snippet: item.content.trim().to_owned(),
            rank: u32::try_from(i + 1).unwrap_or(u32::MAX),
        })
        .collect();
    Ok(results)
}
