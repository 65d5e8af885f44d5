//! Error types for the companion application layer.

use companion_search::SearchError;

/// Top-level error type for the companion binary and library.
#[derive(Debug, thiserror::Error)]
pub enum CompanionError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Search subsystem construction error.
    #[error("search error: {0}")]
    Search(#[from] SearchError),

    /// Logging could not be initialised.
    #[error("logging error: {0}")]
    Logging(String),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, CompanionError>;
