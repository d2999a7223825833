use crate::metrics::{BRANCH_FAILURES_TOTAL, NORMALIZATION_DEFECTS_TOTAL, ROUND_DURATION_SECONDS};
use crate::models::{DisplayLocale, SourceKind};
use crate::search::error::{SearchError, SearchResult};
use crate::search::fence::RoundId;
use crate::search::normalizer::normalize;
use crate::search::outcome::{BranchFailure, RoundOutcome, RoundResult, SourceOutcome};
use crate::sources::SourceQuery;
use futures::future::join_all;
use futures::FutureExt;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, warn};

/// Fans one term out to every collection and settles the round
///
/// Branches run concurrently and are awaited with settle-all semantics: a failing
/// or slow branch never cancels or blocks the bookkeeping of its siblings.
pub struct FanOutAggregator {
    /// One adapter per kind, in priority order
    sources: Vec<Arc<dyn SourceQuery>>,

    /// Locale used when normalizing
    locale: DisplayLocale,
}

impl FanOutAggregator {
    /// Start building an aggregator
    pub fn builder() -> FanOutAggregatorBuilder {
        FanOutAggregatorBuilder::default()
    }

    /// Active display locale
    pub fn locale(&self) -> DisplayLocale {
        self.locale
    }

    /// Kinds served, in priority order
    pub fn kinds(&self) -> Vec<SourceKind> {
        self.sources.iter().map(|s| s.kind()).collect()
    }

    /// Run one round for an already-trimmed term
    ///
    /// Performs no state mutation; the caller decides whether the round is still
    /// current before applying it.
    pub async fn run_round(&self, term: &str, round_id: RoundId) -> RoundResult {
        let start = Instant::now();

        debug!(
            round_id = %round_id,
            term = term,
            branches = self.sources.len(),
            "Dispatching search round"
        );

        let branches = self
            .sources
            .iter()
            .map(|source| Self::run_branch(Arc::clone(source), term));
        let settled = join_all(branches).await;

        let mut result = self.settle(term, round_id, settled);
        result.duration_ms = start.elapsed().as_millis() as u64;
        ROUND_DURATION_SECONDS.observe(start.elapsed().as_secs_f64());

        debug!(
            round_id = %round_id,
            outcome = %result.outcome,
            results = result.results.len(),
            duration_ms = result.duration_ms,
            "Search round settled"
        );

        result
    }

    /// Run one branch, converting every error and panic into a failed outcome
    async fn run_branch(source: Arc<dyn SourceQuery>, term: &str) -> (SourceKind, SourceOutcome) {
        let kind = source.kind();

        let outcome = match AssertUnwindSafe(source.query(term)).catch_unwind().await {
            Ok(Ok(items)) => {
                debug!(source = %kind, items = items.len(), "Source query succeeded");
                SourceOutcome::Ok(items)
            }
            Ok(Err(e)) => {
                let reason = e.to_string();
                let err = e.into_app_error(kind);
                warn!(
                    source = %kind,
                    error_code = err.error_code(),
                    transient = err.is_transient(),
                    error = %err,
                    "Source query failed"
                );
                SourceOutcome::Failed(reason)
            }
            Err(_) => {
                error!(source = %kind, "Source query panicked");
                SourceOutcome::Failed("source query panicked".to_string())
            }
        };

        (kind, outcome)
    }

    /// Classify and normalize settled branch outcomes
    ///
    /// Input order does not matter: output is grouped by source priority.
    pub fn settle(
        &self,
        term: &str,
        round_id: RoundId,
        mut settled: Vec<(SourceKind, SourceOutcome)>,
    ) -> RoundResult {
        settled.sort_by_key(|(kind, _)| kind.priority());

        let total = settled.len();
        let mut failures = Vec::new();
        let mut results = Vec::new();
        let mut seen = HashSet::new();
        let mut defects = 0;

        for (kind, outcome) in settled {
            match outcome {
                SourceOutcome::Failed(reason) => {
                    BRANCH_FAILURES_TOTAL
                        .with_label_values(&[kind.as_ref()])
                        .inc();
                    failures.push(BranchFailure {
                        source: kind,
                        reason,
                    });
                }
                SourceOutcome::Ok(items) => {
                    for (index, raw) in items.iter().enumerate() {
                        match normalize(kind, raw, self.locale) {
                            Ok(result) => {
                                if seen.insert(result.id.clone()) {
                                    results.push(result);
                                } else {
                                    debug!(source = %kind, id = %result.id, "Dropping duplicate result");
                                }
                            }
                            Err(defect) => {
                                defects += 1;
                                NORMALIZATION_DEFECTS_TOTAL
                                    .with_label_values(&[kind.as_ref()])
                                    .inc();
                                warn!(
                                    source = %kind,
                                    index = index,
                                    defect = %defect,
                                    "Skipping malformed record"
                                );
                            }
                        }
                    }
                }
            }
        }

        RoundResult {
            round_id,
            term: term.to_string(),
            outcome: RoundOutcome::classify(failures.len(), total),
            results,
            failures,
            defects,
            duration_ms: 0,
        }
    }
}

/// Builder enforcing exactly one adapter per [`SourceKind`]
#[derive(Default)]
pub struct FanOutAggregatorBuilder {
    sources: Vec<Arc<dyn SourceQuery>>,
    locale: DisplayLocale,
}

impl FanOutAggregatorBuilder {
    /// Register an adapter
    pub fn source(mut self, source: Arc<dyn SourceQuery>) -> Self {
        self.sources.push(source);
        self
    }

    /// Register several adapters
    pub fn sources(mut self, sources: impl IntoIterator<Item = Arc<dyn SourceQuery>>) -> Self {
        self.sources.extend(sources);
        self
    }

    /// Locale used for title/subtitle selection
    pub fn locale(mut self, locale: DisplayLocale) -> Self {
        self.locale = locale;
        self
    }

    pub fn build(mut self) -> SearchResult<FanOutAggregator> {
        let mut registered = HashSet::new();
        for source in &self.sources {
            if !registered.insert(source.kind()) {
                return Err(SearchError::DuplicateSource(source.kind()));
            }
        }
        if let Some(missing) = SourceKind::ALL.iter().find(|k| !registered.contains(*k)) {
            return Err(SearchError::MissingSource(*missing));
        }

        self.sources.sort_by_key(|s| s.kind().priority());

        Ok(FanOutAggregator {
            sources: self.sources,
            locale: self.locale,
        })
    }
}
