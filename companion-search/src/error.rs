//! Error types for the companion-search crate.
//!
//! Engine-level failures ([`SearchError::EngineTimeout`] and
//! [`SearchError::Engine`]) are recovered inside the fan-out coordinator and
//! never reach callers of [`crate::Aggregator::search`]. Only construction
//! errors (bad configuration, HTTP client setup) are surfaced, once, at
//! startup.

use crate::types::EngineId;

/// Errors that can occur while building or running the search aggregator.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// One engine adapter exceeded its individual deadline.
    #[error("{engine} timed out")]
    EngineTimeout {
        /// The engine whose task was cancelled.
        engine: EngineId,
    },

    /// One engine adapter failed (network error, bad status, malformed payload).
    #[error("{engine} failed: {cause}")]
    Engine {
        /// The failing engine.
        engine: EngineId,
        /// Human-readable cause. Never contains credentials.
        cause: String,
    },

    /// The shared HTTP client could not be constructed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Invalid search configuration.
    #[error("config error: {0}")]
    Config(String),
}

impl SearchError {
    /// Shorthand for an [`SearchError::Engine`] failure.
    pub fn engine(engine: EngineId, cause: impl Into<String>) -> Self {
        Self::Engine {
            engine,
            cause: cause.into(),
        }
    }
}

/// Convenience type alias for companion-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
