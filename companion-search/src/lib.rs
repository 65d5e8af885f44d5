//! # companion-search
//!
//! Fan-out web search with a time-sensitivity-aware result cache.
//!
//! A query is classified into a time-sensitivity category, looked up in the
//! cache, and on a miss sent to every registered engine adapter at once. Each
//! adapter runs under its own deadline, so one slow engine never holds up the
//! others. Results are merged, deduplicated by normalised URL and cached for
//! as long as their category allows.
//!
//! ## Design
//!
//! - Adapters for Bing, SearXNG, DuckDuckGo, Qwant, Mojeek, Yep and Startpage
//! - Ordered selector strategies for scraped engines, so markup drift
//!   degrades to "no results" instead of errors
//! - Per-task deadlines in the fan-out, never one shared deadline
//! - Category TTLs from one hour (news) to thirty days (regulation);
//!   unclassified queries are never cached
//! - Injected clock for the cache, so expiry is testable without sleeping
//! - Optional per-engine circuit breaker to skip engines that keep failing
//! - Per-engine minimum spacing between requests, so busy callers do not
//!   get scraped engines to block them
//!
//! ## Security
//!
//! - No API keys or secrets to leak
//! - No network listeners; this is a library, not a server
//! - Search queries are logged only at trace level
//!
//! # Examples
//!
//! ```no_run
//! # async fn example() -> companion_search::Result<()> {
//! let config = companion_search::SearchConfig::default();
//! let aggregator = companion_search::Aggregator::from_config(&config)?;
//! for result in aggregator.search("iPhone 15 price in India").await {
//!     println!("[{}] {}: {}", result.source, result.title, result.url);
//! }
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod cache;
pub mod circuit_breaker;
pub mod classify;
pub mod config;
pub mod engine;
pub mod engines;
pub mod error;
pub mod http;
pub mod orchestrator;
pub mod types;

pub use aggregator::{Aggregator, ResultCache};
pub use cache::{CacheKey, CacheStats, CacheStore, Clock, ManualClock, SystemClock};
pub use classify::{classify, QueryCategory, QueryClassification};
pub use config::SearchConfig;
pub use engine::EngineAdapter;
pub use error::{Result, SearchError};
pub use orchestrator::aggregate;
pub use types::{EngineId, SearchResult};
