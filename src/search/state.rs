use crate::models::AggregatedResult;
use crate::search::config::SearchMessages;
use crate::search::outcome::{RoundOutcome, RoundResult};
use crate::search::selection::SelectionPhase;
use serde::{Deserialize, Serialize, Serializer};

/// Everything the presentation layer renders for one search surface
///
/// Serialized snapshots also carry the derived `loading` and `highlighted_index`
/// fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchUiState {
    /// Trimmed term currently in the box
    pub term: String,

    /// Outcome of the last admitted round for this term
    pub round_outcome: Option<RoundOutcome>,

    /// Results of the last admitted round
    pub results: Vec<AggregatedResult>,

    /// Dropdown phase (carries the highlighted index)
    pub phase: SelectionPhase,

    /// Retry-oriented error after a total failure
    pub error_message: Option<String>,

    /// Low-severity notice after a partial failure
    pub notice: Option<String>,

    /// "No results" message for an empty but healthy round
    pub empty_message: Option<String>,
}

#[derive(Serialize)]
struct SnapshotView<'a> {
    term: &'a str,
    round_outcome: Option<RoundOutcome>,
    results: &'a [AggregatedResult],
    phase: SelectionPhase,
    loading: bool,
    highlighted_index: Option<usize>,
    error_message: Option<&'a str>,
    notice: Option<&'a str>,
    empty_message: Option<&'a str>,
}

impl Serialize for SearchUiState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SnapshotView {
            term: &self.term,
            round_outcome: self.round_outcome,
            results: &self.results,
            phase: self.phase,
            loading: self.loading(),
            highlighted_index: self.highlighted_index(),
            error_message: self.error_message.as_deref(),
            notice: self.notice.as_deref(),
            empty_message: self.empty_message.as_deref(),
        }
        .serialize(serializer)
    }
}

impl SearchUiState {
    /// Whether a round for the current term is outstanding
    pub fn loading(&self) -> bool {
        self.phase == SelectionPhase::OpenLoading
    }

    /// Index of the highlighted result
    pub fn highlighted_index(&self) -> Option<usize> {
        self.phase.highlighted()
    }

    /// The highlighted result, if any
    pub fn highlighted(&self) -> Option<&AggregatedResult> {
        self.highlighted_index().and_then(|i| self.results.get(i))
    }

    /// Start waiting for a round for a new non-empty term
    ///
    /// Output from any earlier term is dropped.
    pub(crate) fn begin_loading(&mut self, term: &str) {
        *self = SearchUiState {
            term: term.to_string(),
            ..Default::default()
        };
        self.phase.on_term_changed(false);
    }

    /// Replace everything with an admitted round's output
    pub(crate) fn admit(&mut self, round: RoundResult, messages: &SearchMessages) {
        let RoundResult {
            term,
            outcome,
            results,
            ..
        } = round;

        let results = if outcome.shows_results() {
            results
        } else {
            Vec::new()
        };

        let mut phase = self.phase;
        phase.on_round_admitted(outcome, results.len());

        *self = SearchUiState {
            term,
            round_outcome: Some(outcome),
            error_message: (outcome == RoundOutcome::TotalFailure)
                .then(|| messages.total_failure.clone()),
            notice: (outcome == RoundOutcome::PartialFailure)
                .then(|| messages.partial_notice.clone()),
            empty_message: (phase == SelectionPhase::OpenEmpty)
                .then(|| messages.no_results.clone()),
            results,
            phase,
        };
    }

    /// Hide results and messages but keep the term
    pub(crate) fn dismiss(&mut self) {
        *self = SearchUiState {
            term: std::mem::take(&mut self.term),
            ..Default::default()
        };
    }
}
