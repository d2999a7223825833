use crate::config::SourcesConfig;
use crate::error::Result;
use crate::models::SourceKind;
use crate::search::SearchConfig;
use crate::sources::{RawItem, SourceError, SourceQuery};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Query parameter carrying the search term
const TERM_PARAM: &str = "search";

/// Response envelope shared by all collection endpoints
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
}

/// Paged payload returned by the reports endpoint
#[derive(Debug, Deserialize)]
struct PagedItems {
    #[serde(default)]
    items: Vec<RawItem>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
struct Pagination {
    #[serde(default)]
    total: Option<u64>,
}

/// HTTP adapter for one collection endpoint
#[derive(Clone)]
pub struct HttpSource {
    client: Client,
    kind: SourceKind,
    url: String,
    limit: usize,
}

/// Ready-made adapter set for all three collections
pub type HttpSourceSet = Vec<Arc<dyn SourceQuery>>;

impl HttpSource {
    /// Create an adapter for `kind` at `url`
    pub fn new(client: Client, kind: SourceKind, url: impl Into<String>, limit: usize) -> Self {
        Self {
            client,
            kind,
            url: url.into(),
            limit,
        }
    }

    /// Build one adapter per collection from configuration, sharing one client
    pub fn from_config(sources: &SourcesConfig, search: &SearchConfig) -> Result<HttpSourceSet> {
        let client = Client::builder()
            .timeout(Duration::from_secs(sources.timeout_secs))
            .build()?;

        let base = sources.base_url.trim_end_matches('/');

        Ok(SourceKind::ALL
            .iter()
            .map(|kind| {
                let url = format!("{}{}", base, sources.path_for(*kind));
                Arc::new(HttpSource::new(
                    client.clone(),
                    *kind,
                    url,
                    search.limit_for(*kind),
                )) as Arc<dyn SourceQuery>
            })
            .collect())
    }

    /// Endpoint this adapter queries
    pub fn url(&self) -> &str {
        &self.url
    }

    fn unwrap_envelope<T>(&self, envelope: Envelope<T>) -> std::result::Result<T, SourceError> {
        if !envelope.success {
            return Err(SourceError::Rejected(
                envelope
                    .message
                    .unwrap_or_else(|| "success flag was false".to_string()),
            ));
        }
        envelope
            .data
            .ok_or_else(|| SourceError::Decode("envelope has no data".to_string()))
    }
}

#[async_trait]
impl SourceQuery for HttpSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn query(&self, term: &str) -> std::result::Result<Vec<RawItem>, SourceError> {
        let limit = self.limit.to_string();
        let mut params = vec![(TERM_PARAM, term), ("limit", limit.as_str())];
        if self.kind == SourceKind::Report {
            params.push(("page", "1"));
        }

        let response = self
            .client
            .get(&self.url)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let items = match self.kind {
            SourceKind::Report => {
                let envelope: Envelope<PagedItems> = response.json().await?;
                let page = self.unwrap_envelope(envelope)?;
                debug!(
                    source = %self.kind,
                    returned = page.items.len(),
                    total = ?page.pagination.and_then(|p| p.total),
                    "Report page received"
                );
                page.items
            }
            SourceKind::Individual | SourceKind::Organization => {
                let envelope: Envelope<Vec<RawItem>> = response.json().await?;
                self.unwrap_envelope(envelope)?
            }
        };

        Ok(items)
    }
}
