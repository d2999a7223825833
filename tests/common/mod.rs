//! Common test utilities
//!
//! Scripted source adapters with per-term delays and failures, plus telemetry
//! capabilities that record or misbehave.

#![allow(dead_code)]

use async_trait::async_trait;
use incident_typeahead::models::{AggregatedResult, SourceKind};
use incident_typeahead::search::{
    FanOutAggregator, SearchConfig, SearchConfigBuilder, TypeaheadEngine,
};
use incident_typeahead::sources::{RawItem, SourceError, SourceQuery};
use incident_typeahead::telemetry::{SearchTelemetry, TelemetryError, TelemetryEvent};
use parking_lot::Mutex;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// How a scripted source answers
#[derive(Debug, Clone)]
pub enum Reply {
    Items(Vec<RawItem>),
    Fail(SourceError),
    Panic,
}

#[derive(Debug, Clone)]
struct Script {
    delay: Duration,
    reply: Reply,
}

/// Source adapter whose answers are scripted per term
pub struct ScriptedSource {
    kind: SourceKind,
    fallback: Mutex<Script>,
    by_term: Mutex<HashMap<String, Script>>,
    calls: Mutex<Vec<String>>,
    completed: Mutex<Vec<String>>,
}

impl ScriptedSource {
    /// A source answering every term with no items and no delay
    pub fn new(kind: SourceKind) -> Arc<Self> {
        Arc::new(Self {
            kind,
            fallback: Mutex::new(Script {
                delay: Duration::ZERO,
                reply: Reply::Items(vec![]),
            }),
            by_term: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            completed: Mutex::new(Vec::new()),
        })
    }

    /// A source answering every term with `items`
    pub fn with_items(kind: SourceKind, items: Vec<RawItem>) -> Arc<Self> {
        let source = Self::new(kind);
        source.answer(Duration::ZERO, Reply::Items(items));
        source
    }

    /// A source failing every term
    pub fn failing(kind: SourceKind) -> Arc<Self> {
        let source = Self::new(kind);
        source.answer(Duration::ZERO, Reply::Fail(SourceError::Status(500)));
        source
    }

    /// Set the answer for every term without a specific script
    pub fn answer(&self, delay: Duration, reply: Reply) {
        *self.fallback.lock() = Script { delay, reply };
    }

    /// Set the answer for one term
    pub fn answer_term(&self, term: &str, delay: Duration, reply: Reply) {
        self.by_term
            .lock()
            .insert(term.to_string(), Script { delay, reply });
    }

    /// Terms queried so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Terms whose query ran to completion
    pub fn completed(&self) -> Vec<String> {
        self.completed.lock().clone()
    }

    pub fn as_source(self: &Arc<Self>) -> Arc<dyn SourceQuery> {
        Arc::clone(self) as Arc<dyn SourceQuery>
    }
}

#[async_trait]
impl SourceQuery for ScriptedSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn query(&self, term: &str) -> Result<Vec<RawItem>, SourceError> {
        self.calls.lock().push(term.to_string());
        let script = self
            .by_term
            .lock()
            .get(term)
            .cloned()
            .unwrap_or_else(|| self.fallback.lock().clone());

        if !script.delay.is_zero() {
            tokio::time::sleep(script.delay).await;
        }
        self.completed.lock().push(term.to_string());

        match script.reply {
            Reply::Items(items) => Ok(items),
            Reply::Fail(err) => Err(err),
            Reply::Panic => panic!("scripted panic for {}", term),
        }
    }
}

/// The three scripted sources behind one aggregator
pub struct Sources {
    pub reports: Arc<ScriptedSource>,
    pub individuals: Arc<ScriptedSource>,
    pub organizations: Arc<ScriptedSource>,
}

impl Sources {
    pub fn empty() -> Self {
        Self {
            reports: ScriptedSource::new(SourceKind::Report),
            individuals: ScriptedSource::new(SourceKind::Individual),
            organizations: ScriptedSource::new(SourceKind::Organization),
        }
    }

    pub fn new(
        reports: Arc<ScriptedSource>,
        individuals: Arc<ScriptedSource>,
        organizations: Arc<ScriptedSource>,
    ) -> Self {
        Self {
            reports,
            individuals,
            organizations,
        }
    }

    pub fn get(&self, kind: SourceKind) -> &Arc<ScriptedSource> {
        match kind {
            SourceKind::Report => &self.reports,
            SourceKind::Individual => &self.individuals,
            SourceKind::Organization => &self.organizations,
        }
    }

    /// Build an aggregator; sources are registered out of priority order on purpose
    pub fn aggregator(&self) -> Arc<FanOutAggregator> {
        Arc::new(
            FanOutAggregator::builder()
                .source(self.organizations.as_source())
                .source(self.reports.as_source())
                .source(self.individuals.as_source())
                .build()
                .unwrap(),
        )
    }

    /// Build an engine with a 300 ms debounce
    pub fn engine(&self) -> TypeaheadEngine {
        self.engine_with(test_config())
    }

    pub fn engine_with(&self, config: SearchConfig) -> TypeaheadEngine {
        TypeaheadEngine::builder(self.aggregator())
            .config(config)
            .build()
            .unwrap()
    }
}

pub fn test_config() -> SearchConfig {
    SearchConfigBuilder::new().debounce_ms(300).build()
}

pub fn report(id: u64, title: &str) -> RawItem {
    json!({
        "id": id,
        "title_en": title,
        "location_en": "Tehran",
        "incident_date": "2024-03-01"
    })
}

pub fn individual(id: u64, name: &str) -> RawItem {
    json!({
        "id": id,
        "name_en": name,
        "role_en": "Journalist"
    })
}

pub fn organization(id: u64, name: &str) -> RawItem {
    json!({
        "id": id,
        "name_en": name,
        "category_en": "NGO"
    })
}

/// Telemetry that keeps every event
#[derive(Default)]
pub struct RecordingTelemetry {
    events: Mutex<Vec<TelemetryEvent>>,
}

impl RecordingTelemetry {
    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.events.lock().clone()
    }
}

impl SearchTelemetry for RecordingTelemetry {
    fn capture(&self, event: &TelemetryEvent) -> Result<(), TelemetryError> {
        self.events.lock().push(event.clone());
        Ok(())
    }
}

/// Telemetry that always errors
pub struct FailingTelemetry;

impl SearchTelemetry for FailingTelemetry {
    fn capture(&self, _event: &TelemetryEvent) -> Result<(), TelemetryError> {
        Err(TelemetryError::Unavailable("collector offline".to_string()))
    }
}

/// Telemetry that always panics
pub struct PanickingTelemetry;

impl SearchTelemetry for PanickingTelemetry {
    fn capture(&self, _event: &TelemetryEvent) -> Result<(), TelemetryError> {
        panic!("telemetry client crashed");
    }
}

/// Selection handler that keeps every picked result
pub fn recording_selection() -> (
    Arc<Mutex<Vec<AggregatedResult>>>,
    impl Fn(&AggregatedResult) + Send + Sync + 'static,
) {
    let picked = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&picked);
    (picked, move |result: &AggregatedResult| {
        sink.lock().push(result.clone())
    })
}
