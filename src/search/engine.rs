//! Type-ahead engine
//!
//! One [`TypeaheadEngine`] backs one mounted search box. It owns the visible
//! [`SearchUiState`] and the [`RoundFence`], drives the debounce timer and spawns one
//! task per round. A round's output is written only if its id is still current at
//! the moment of the write; the check and the write share the watch channel's lock.

use crate::metrics::{ROUNDS_DISCARDED_TOTAL, ROUNDS_TOTAL, SELECTIONS_TOTAL};
use crate::models::AggregatedResult;
use crate::search::aggregator::FanOutAggregator;
use crate::search::config::{SearchConfig, SearchMessages, SurfaceKind};
use crate::search::debounce::DebounceScheduler;
use crate::search::error::SearchResult;
use crate::search::fence::RoundFence;
use crate::search::outcome::RoundResult;
use crate::search::selection::{KeyEffect, NavKey, SelectionPhase};
use crate::search::state::SearchUiState;
use crate::telemetry::{capture_quietly, NoopTelemetry, SharedTelemetry, TelemetryEvent};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

/// Receives the result the user picked
pub trait SelectionHandler: Send + Sync + 'static {
    fn on_select(&self, result: &AggregatedResult);
}

impl<F> SelectionHandler for F
where
    F: Fn(&AggregatedResult) + Send + Sync + 'static,
{
    fn on_select(&self, result: &AggregatedResult) {
        self(result)
    }
}

struct EngineInner {
    surface: SurfaceKind,
    surface_id: Uuid,
    aggregator: Arc<FanOutAggregator>,
    fence: RoundFence,
    debounce: DebounceScheduler,
    state: watch::Sender<SearchUiState>,
    messages: SearchMessages,
    selection: Arc<dyn SelectionHandler>,
    telemetry: SharedTelemetry,
    cancel_in_flight: bool,
    in_flight: Mutex<Option<JoinHandle<()>>>,
    shut_down: AtomicBool,
}

/// Search engine for one surface
///
/// Cheap to clone; all clones drive the same state. Dropping the last clone has the
/// same effect as [`shutdown`](Self::shutdown).
#[derive(Clone)]
pub struct TypeaheadEngine {
    inner: Arc<EngineInner>,
}

impl TypeaheadEngine {
    /// Start building an engine around an aggregator
    pub fn builder(aggregator: Arc<FanOutAggregator>) -> TypeaheadEngineBuilder {
        TypeaheadEngineBuilder::new(aggregator)
    }

    /// Unique id of this surface, used to correlate log lines
    pub fn surface_id(&self) -> Uuid {
        self.inner.surface_id
    }

    /// Hosting surface
    pub fn surface(&self) -> SurfaceKind {
        self.inner.surface
    }

    /// Snapshot of the visible state
    pub fn state(&self) -> SearchUiState {
        self.inner.state.borrow().clone()
    }

    /// Watch visible state changes
    pub fn subscribe(&self) -> watch::Receiver<SearchUiState> {
        self.inner.state.subscribe()
    }

    /// Whether [`shutdown`](Self::shutdown) has been called
    pub fn is_shut_down(&self) -> bool {
        self.inner.is_shut_down()
    }

    /// Feed the raw contents of the search box
    ///
    /// An empty or whitespace-only term clears synchronously. Any other new term
    /// drops the previous output, shows the loading phase and re-arms the debounce
    /// timer. Repeating the term that is already open changes nothing.
    ///
    /// Must be called from within a tokio runtime.
    pub fn on_term_changed(&self, raw: &str) {
        let inner = &self.inner;
        if inner.is_shut_down() {
            return;
        }

        let term = raw.trim();
        if term.is_empty() {
            self.clear();
            return;
        }

        let changed = inner.state.send_if_modified(|state| {
            if state.term == term && state.phase.is_open() {
                return false;
            }
            inner.fence.invalidate();
            state.begin_loading(term);
            true
        });
        if !changed {
            return;
        }
        inner.abort_superseded();

        let weak = Arc::downgrade(inner);
        let term = term.to_string();
        inner.debounce.schedule(move || {
            if let Some(inner) = weak.upgrade() {
                EngineInner::start_round(&inner, term);
            }
        });
    }

    /// Reset to the empty state
    ///
    /// Cancels the pending debounce trigger and fences out any round in flight, so
    /// its completion cannot repopulate the list.
    pub fn clear(&self) {
        let inner = &self.inner;
        if inner.is_shut_down() {
            return;
        }

        inner.debounce.cancel();
        inner.state.send_if_modified(|state| {
            inner.fence.invalidate();
            let changed = *state != SearchUiState::default();
            *state = SearchUiState::default();
            changed
        });
        inner.abort_superseded();
        debug!(surface_id = %inner.surface_id, "Search cleared");
    }

    /// Apply a navigation key
    ///
    /// Returns the selected result when Enter picked one. The selection handler has
    /// already been called and the term cleared by then.
    pub fn on_key(&self, key: NavKey) -> Option<AggregatedResult> {
        let inner = &self.inner;
        if inner.is_shut_down() {
            return None;
        }

        let mut effect = KeyEffect::Ignored;
        let mut selected = None;
        inner.state.send_if_modified(|state| {
            effect = state.phase.on_key(key, state.results.len());
            match effect {
                KeyEffect::Ignored => false,
                KeyEffect::Moved(_) => true,
                KeyEffect::Select(index) => {
                    selected = state.results.get(index).cloned();
                    inner.fence.invalidate();
                    *state = SearchUiState::default();
                    true
                }
                KeyEffect::Dismiss => {
                    inner.fence.invalidate();
                    state.dismiss();
                    true
                }
            }
        });

        match effect {
            KeyEffect::Ignored | KeyEffect::Moved(_) => None,
            KeyEffect::Dismiss => {
                inner.debounce.cancel();
                inner.abort_superseded();
                debug!(surface_id = %inner.surface_id, "Results dismissed");
                capture_quietly(
                    inner.telemetry.as_ref(),
                    TelemetryEvent::Dismissed {
                        surface: inner.surface,
                    },
                );
                None
            }
            KeyEffect::Select(_) => {
                inner.debounce.cancel();
                let result = selected?;
                SELECTIONS_TOTAL
                    .with_label_values(&[result.kind.as_ref()])
                    .inc();
                info!(
                    surface_id = %inner.surface_id,
                    result_id = %result.id,
                    url = %result.url,
                    "Result selected"
                );
                capture_quietly(
                    inner.telemetry.as_ref(),
                    TelemetryEvent::ResultSelected {
                        surface: inner.surface,
                        source: result.kind,
                        result_id: result.id.clone(),
                    },
                );
                inner.selection.on_select(&result);
                Some(result)
            }
        }
    }

    /// Tear the engine down
    ///
    /// Cancels the debounce timer, fences out and aborts the round in flight. Every
    /// later call is a no-op and late completions are discarded. Idempotent.
    pub fn shutdown(&self) {
        let inner = &self.inner;
        if inner.shut_down.swap(true, Ordering::AcqRel) {
            return;
        }
        inner.debounce.cancel();
        inner.fence.invalidate();
        if let Some(handle) = inner.in_flight.lock().take() {
            handle.abort();
        }
        debug!(surface_id = %inner.surface_id, "Search engine shut down");
    }
}

impl EngineInner {
    fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }

    /// Debounce fired: issue a round id and spawn the round
    fn start_round(inner: &Arc<EngineInner>, term: String) {
        if inner.is_shut_down() {
            return;
        }

        let mut issued = None;
        inner.state.send_if_modified(|state| {
            if state.term == term && state.phase == SelectionPhase::OpenLoading {
                issued = Some(inner.fence.begin_round());
            }
            false
        });
        let Some(round_id) = issued else {
            debug!(surface_id = %inner.surface_id, term = %term, "Debounced term no longer pending");
            return;
        };

        debug!(
            surface_id = %inner.surface_id,
            surface = %inner.surface,
            round_id = %round_id,
            term = %term,
            "Starting search round"
        );

        let aggregator = Arc::clone(&inner.aggregator);
        let weak: Weak<EngineInner> = Arc::downgrade(inner);
        let handle = tokio::spawn(async move {
            let result = aggregator.run_round(&term, round_id).await;
            match weak.upgrade() {
                Some(inner) => inner.admit(result),
                None => {
                    ROUNDS_DISCARDED_TOTAL.inc();
                    debug!(round_id = %round_id, "Engine dropped before round completed");
                }
            }
        });

        let previous = inner.in_flight.lock().replace(handle);
        if let Some(previous) = previous {
            if inner.cancel_in_flight && !previous.is_finished() {
                previous.abort();
            }
        }
    }

    /// Write a settled round if it is still current
    fn admit(&self, result: RoundResult) {
        let round_id = result.round_id;
        let outcome = result.outcome;
        let result_count = if outcome.shows_results() {
            result.results.len()
        } else {
            0
        };
        let failed_sources: Vec<_> = result.failures.iter().map(|f| f.source).collect();
        let duration_ms = result.duration_ms;

        let admitted = self.state.send_if_modified(|state| {
            if self.is_shut_down()
                || !self.fence.is_current(round_id)
                || state.term != result.term
            {
                return false;
            }
            state.admit(result, &self.messages);
            true
        });

        if !admitted {
            ROUNDS_DISCARDED_TOTAL.inc();
            debug!(
                surface_id = %self.surface_id,
                round_id = %round_id,
                current = self.fence.current(),
                "Discarding stale round"
            );
            return;
        }

        ROUNDS_TOTAL.with_label_values(&[outcome.to_string().as_str()]).inc();
        info!(
            surface_id = %self.surface_id,
            surface = %self.surface,
            round_id = %round_id,
            outcome = %outcome,
            results = result_count,
            duration_ms = duration_ms,
            "Search round admitted"
        );

        capture_quietly(
            self.telemetry.as_ref(),
            TelemetryEvent::RoundAdmitted {
                surface: self.surface,
                outcome,
                result_count,
                failed_sources,
                duration_ms,
            },
        );
    }

    /// Abort the tracked round task when hard cancellation is enabled
    fn abort_superseded(&self) {
        if !self.cancel_in_flight {
            return;
        }
        if let Some(handle) = self.in_flight.lock().take() {
            handle.abort();
        }
    }
}

impl Drop for EngineInner {
    fn drop(&mut self) {
        self.fence.invalidate();
        if let Some(handle) = self.in_flight.get_mut().take() {
            handle.abort();
        }
    }
}

/// Builder for [`TypeaheadEngine`]
pub struct TypeaheadEngineBuilder {
    aggregator: Arc<FanOutAggregator>,
    config: SearchConfig,
    messages: SearchMessages,
    selection: Arc<dyn SelectionHandler>,
    telemetry: SharedTelemetry,
}

impl TypeaheadEngineBuilder {
    fn new(aggregator: Arc<FanOutAggregator>) -> Self {
        Self {
            aggregator,
            config: SearchConfig::default(),
            messages: SearchMessages::default(),
            selection: Arc::new(|_: &AggregatedResult| {}),
            telemetry: Arc::new(NoopTelemetry),
        }
    }

    pub fn config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn messages(mut self, messages: SearchMessages) -> Self {
        self.messages = messages;
        self
    }

    /// Handler called with the result picked by Enter
    pub fn on_select(mut self, handler: impl SelectionHandler) -> Self {
        self.selection = Arc::new(handler);
        self
    }

    pub fn telemetry(mut self, telemetry: SharedTelemetry) -> Self {
        self.telemetry = telemetry;
        self
    }

    pub fn build(self) -> SearchResult<TypeaheadEngine> {
        self.config.validate()?;

        let (state, _) = watch::channel(SearchUiState::default());
        let inner = EngineInner {
            surface: self.config.surface,
            surface_id: Uuid::new_v4(),
            aggregator: self.aggregator,
            fence: RoundFence::new(),
            debounce: DebounceScheduler::new(self.config.debounce()),
            state,
            messages: self.messages,
            selection: self.selection,
            telemetry: self.telemetry,
            cancel_in_flight: self.config.cancel_in_flight,
            in_flight: Mutex::new(None),
            shut_down: AtomicBool::new(false),
        };

        debug!(
            surface_id = %inner.surface_id,
            surface = %inner.surface,
            debounce_ms = self.config.debounce_ms,
            cancel_in_flight = inner.cancel_in_flight,
            "Search engine created"
        );

        Ok(TypeaheadEngine {
            inner: Arc::new(inner),
        })
    }
}
