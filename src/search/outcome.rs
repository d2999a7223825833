use crate::models::{AggregatedResult, SourceKind};
use crate::search::fence::RoundId;
use crate::sources::RawItem;
use serde::{Deserialize, Serialize};
use strum::Display;

/// Settled result of one collection query within a round
#[derive(Debug, Clone)]
pub enum SourceOutcome {
    /// Query succeeded with collection-native items
    Ok(Vec<RawItem>),
    /// Query failed; the reason is kept for logs and diagnostics
    Failed(String),
}

impl SourceOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, SourceOutcome::Failed(_))
    }
}

/// Classification of a settled round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RoundOutcome {
    /// Every collection answered
    Success,
    /// Some, but not all, collections failed
    PartialFailure,
    /// Every collection failed
    TotalFailure,
}

impl RoundOutcome {
    /// Classify a round by its failure count
    ///
    /// The policy is count-based only: which collection failed does not matter.
    pub fn classify(failed: usize, total: usize) -> Self {
        if failed == 0 {
            RoundOutcome::Success
        } else if failed >= total {
            RoundOutcome::TotalFailure
        } else {
            RoundOutcome::PartialFailure
        }
    }

    /// Whether results from this round may be rendered
    pub fn shows_results(&self) -> bool {
        !matches!(self, RoundOutcome::TotalFailure)
    }
}

/// A failed branch, kept for diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchFailure {
    pub source: SourceKind,
    pub reason: String,
}

/// Everything one round produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundResult {
    /// Fencing token the round ran under
    pub round_id: RoundId,

    /// Trimmed term the round searched for
    pub term: String,

    /// Classification of the round
    pub outcome: RoundOutcome,

    /// Normalized results, grouped by source priority
    pub results: Vec<AggregatedResult>,

    /// Branches that failed
    pub failures: Vec<BranchFailure>,

    /// Items dropped during normalization
    pub defects: usize,

    /// Wall-clock time until every branch settled (milliseconds)
    pub duration_ms: u64,
}
