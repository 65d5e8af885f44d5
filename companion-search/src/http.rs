//! Shared HTTP client with User-Agent rotation for engine requests.
//!
//! Every adapter holds a clone of one [`reqwest::Client`] built here. The
//! client's timeout is the per-attempt `request_timeout_secs`, which is kept
//! shorter than the coordinator's per-adapter deadline so an adapter with
//! several attempts (Searx, Qwant) can still fall back within its budget.

use std::time::Duration;

use rand::seq::SliceRandom;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::types::EngineId;

/// Realistic browser User-Agent strings, rotated per request.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:133.0) Gecko/20100101 Firefox/133.0",
];

/// Build the [`reqwest::Client`] shared by all adapters.
///
/// The client has a cookie store (consent pages), the per-attempt timeout
/// from config, and brotli/gzip decompression.
///
/// # Errors
///
/// Returns [`SearchError::Http`] if the client cannot be constructed.
pub fn build_client(config: &SearchConfig) -> Result<reqwest::Client, SearchError> {
    reqwest::Client::builder()
        .cookie_store(true)
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| SearchError::Http(format!("failed to build HTTP client: {e}")))
}

/// User-Agent for one request: the configured one, or a random browser UA.
pub fn user_agent(config: &SearchConfig) -> String {
    match config.user_agent {
        Some(ref custom) => custom.clone(),
        None => random_user_agent().to_owned(),
    }
}

/// Select a random User-Agent string from the rotation list.
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS
        .choose(&mut rng)
        .copied()
        // USER_AGENTS is a non-empty const array
        .unwrap_or(USER_AGENTS[0])
}

/// Send a prepared request and read the body as text.
///
/// Transport errors, non-success statuses and body read failures all map to
/// [`SearchError::Engine`] tagged with `engine`.
pub async fn fetch_text(
    request: reqwest::RequestBuilder,
    engine: EngineId,
) -> Result<String, SearchError> {
    let response = request
        .send()
        .await
        .map_err(|e| SearchError::engine(engine, format!("request failed: {e}")))?
        .error_for_status()
        .map_err(|e| SearchError::engine(engine, format!("HTTP error: {e}")))?;

    let body = response
        .text()
        .await
        .map_err(|e| SearchError::engine(engine, format!("response read failed: {e}")))?;

    tracing::trace!(%engine, bytes = body.len(), "response received");
    Ok(body)
}
