//! Error types for search operations
//!
//! Expected failure modes (branch failures, malformed records, stale rounds) are
//! typed outcomes, never errors. These variants cover programmer errors only.

use crate::error::AppError;
use crate::models::SourceKind;

/// Result type for search operations
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Errors that can occur while assembling a search engine
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// No adapter registered for a collection
    #[error("No source registered for {0}")]
    MissingSource(SourceKind),

    /// More than one adapter registered for a collection
    #[error("Source registered twice for {0}")]
    DuplicateSource(SourceKind),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::InvalidConfiguration(msg) => AppError::Configuration(msg),
            _ => AppError::Internal(err.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for SearchError {
    fn from(err: validator::ValidationErrors) -> Self {
        SearchError::InvalidConfiguration(err.to_string())
    }
}
