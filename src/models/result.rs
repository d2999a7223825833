use crate::models::SourceKind;
use serde::{Deserialize, Serialize};

/// Uniform, render-ready record produced from one collection item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedResult {
    /// Unique within a round: `<kind>-<entity id>`
    pub id: String,

    /// Collection the item came from
    #[serde(rename = "type")]
    pub kind: SourceKind,

    /// Display title (may be empty, never absent)
    pub title: String,

    /// Secondary line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,

    /// Detail-view URL used when the result is selected
    pub url: String,
}

impl AggregatedResult {
    /// Compose a result for an entity of the given kind
    pub fn new(
        kind: SourceKind,
        entity_id: &str,
        title: impl Into<String>,
        subtitle: Option<String>,
    ) -> Self {
        Self {
            id: format!("{}-{}", kind, entity_id),
            kind,
            title: title.into(),
            subtitle,
            url: kind.detail_url(entity_id),
        }
    }
}
