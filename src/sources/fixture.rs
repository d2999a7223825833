use crate::error::{AppError, Result};
use crate::models::SourceKind;
use crate::search::SearchConfig;
use crate::sources::{RawItem, SourceError, SourceQuery};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// In-memory adapter over a fixed list of collection records
///
/// An item matches when any of its string fields contains the term,
/// case-insensitively. Results keep the fixture order and are capped at `limit`.
#[derive(Debug, Clone)]
pub struct FixtureSource {
    kind: SourceKind,
    items: Arc<Vec<RawItem>>,
    limit: usize,
}

/// On-disk fixture layout: one array per collection
#[derive(Debug, Default, Deserialize)]
struct FixtureFile {
    #[serde(default)]
    reports: Vec<RawItem>,
    #[serde(default)]
    individuals: Vec<RawItem>,
    #[serde(default)]
    organizations: Vec<RawItem>,
}

impl FixtureSource {
    /// Create a fixture adapter
    pub fn new(kind: SourceKind, items: Vec<RawItem>, limit: usize) -> Self {
        Self {
            kind,
            items: Arc::new(items),
            limit,
        }
    }

    /// Load one adapter per collection from a JSON fixture file
    ///
    /// The file holds `reports`, `individuals` and `organizations` arrays; missing
    /// arrays become empty collections. Per-kind limits come from `search`.
    pub fn load_all(path: &Path, search: &SearchConfig) -> Result<Vec<Arc<dyn SourceQuery>>> {
        let content = std::fs::read_to_string(path)?;
        let file: FixtureFile = serde_json::from_str(&content)?;

        let mut by_kind: HashMap<SourceKind, Vec<RawItem>> = HashMap::from([
            (SourceKind::Report, file.reports),
            (SourceKind::Individual, file.individuals),
            (SourceKind::Organization, file.organizations),
        ]);

        SourceKind::ALL
            .iter()
            .map(|kind| {
                let items = by_kind.remove(kind).ok_or_else(|| {
                    AppError::Internal(format!("fixture collection {} missing", kind))
                })?;
                Ok(Arc::new(FixtureSource::new(*kind, items, search.limit_for(*kind)))
                    as Arc<dyn SourceQuery>)
            })
            .collect()
    }

    fn matches(item: &RawItem, needle: &str) -> bool {
        match item {
            serde_json::Value::String(s) => s.to_lowercase().contains(needle),
            serde_json::Value::Array(values) => values.iter().any(|v| Self::matches(v, needle)),
            serde_json::Value::Object(map) => map.values().any(|v| Self::matches(v, needle)),
            _ => false,
        }
    }
}

#[async_trait]
impl SourceQuery for FixtureSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn query(&self, term: &str) -> std::result::Result<Vec<RawItem>, SourceError> {
        let needle = term.to_lowercase();
        Ok(self
            .items
            .iter()
            .filter(|item| Self::matches(item, &needle))
            .take(self.limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[tokio::test]
    async fn test_fixture_matches_case_insensitively() {
        let source = FixtureSource::new(
            SourceKind::Report,
            vec![
                json!({"id": 1, "title_en": "Protest in Tehran"}),
                json!({"id": 2, "title_en": "Strike in Tabriz"}),
                json!({"id": 3, "location_en": "TEHRAN province"}),
            ],
            10,
        );

        let items = source.query("tehran").await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["id"], 1);
        assert_eq!(items[1]["id"], 3);
    }

    #[tokio::test]
    async fn test_fixture_respects_limit() {
        let items = (0..10)
            .map(|i| json!({"id": i, "name_en": "Acme"}))
            .collect();
        let source = FixtureSource::new(SourceKind::Organization, items, 3);
        assert_eq!(source.query("acme").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_load_all_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"reports": [{{"id": 1, "title_en": "Tehran"}}], "organizations": []}}"#
        )
        .unwrap();

        let sources = FixtureSource::load_all(file.path(), &SearchConfig::default()).unwrap();
        let kinds: Vec<_> = sources.iter().map(|s| s.kind()).collect();
        assert_eq!(kinds, SourceKind::ALL.to_vec());
        assert_eq!(sources[0].query("teh").await.unwrap().len(), 1);
        assert!(sources[1].query("teh").await.unwrap().is_empty());
    }
}
