//! Source query adapters
//!
//! Each searchable collection sits behind a [`SourceQuery`] implementation. The
//! search core only ever sees the trait: it hands over a trimmed term and gets back
//! raw collection-native items or a [`SourceError`].
//!
//! - [`HttpSource`]: queries the collection endpoints over HTTP
//! - [`FixtureSource`]: serves items from an in-memory JSON array

mod fixture;
mod http;

pub use fixture::FixtureSource;
pub use http::{HttpSource, HttpSourceSet};

use crate::error::AppError;
use crate::models::SourceKind;
use async_trait::async_trait;

/// A collection-native record, exactly as the backend returned it
pub type RawItem = serde_json::Value;

/// Trait for per-collection query adapters
///
/// Implementations must be read-only and safe to call concurrently with sibling
/// adapters and with themselves across rounds.
#[async_trait]
pub trait SourceQuery: Send + Sync + 'static {
    /// Collection this adapter queries
    fn kind(&self) -> SourceKind;

    /// Run one query for the given term
    async fn query(&self, term: &str) -> Result<Vec<RawItem>, SourceError>;
}

/// Errors a single collection query can produce
#[derive(Debug, Clone, thiserror::Error)]
pub enum SourceError {
    /// Request never produced a response (connect, timeout, reset)
    #[error("transport error: {0}")]
    Transport(String),

    /// Backend answered with a non-success HTTP status
    #[error("unexpected status {0}")]
    Status(u16),

    /// Envelope decoded but reported `success: false`
    #[error("backend rejected query: {0}")]
    Rejected(String),

    /// Response body did not match the expected envelope
    #[error("undecodable response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SourceError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            SourceError::Status(status.as_u16())
        } else {
            SourceError::Transport(err.to_string())
        }
    }
}

impl SourceError {
    /// Lift into an application error tagged with the failing collection
    pub fn into_app_error(self, kind: SourceKind) -> AppError {
        AppError::Integration {
            integration_source: kind.to_string(),
            message: self.to_string(),
        }
    }
}
