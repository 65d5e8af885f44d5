//! Trait definition for pluggable search engine adapters.
//!
//! Each backend (Bing, Searx, DuckDuckGo, Qwant, Mojeek, Yep, Startpage)
//! implements [`EngineAdapter`] so the fan-out coordinator can drive them
//! uniformly as `Arc<dyn EngineAdapter>`.

use async_trait::async_trait;

use crate::error::SearchError;
use crate::types::{EngineId, SearchResult};

/// A pluggable search engine backend.
///
/// Implementors translate a query into one backend's protocol and parse the
/// response into [`SearchResult`] values with `rank` set to the 1-based
/// position in that backend's page. Each adapter handles its own:
///
/// - URL construction with query encoding
/// - HTTP request with appropriate headers
/// - JSON decoding or HTML extraction with selector fallbacks
///
/// All implementations must be `Send + Sync` for concurrent fan-out.
#[async_trait]
pub trait EngineAdapter: Send + Sync {
    /// Which engine this adapter represents. Used as the result source tag.
    fn id(&self) -> EngineId;

    /// Perform a search and return parsed results in engine rank order.
    ///
    /// An empty vector means the backend legitimately found nothing.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Engine`] if the backend could not be reached or
    /// answered with something unusable.
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError>;
}
