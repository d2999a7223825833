//! Round fencing
//!
//! Every debounced search attempt gets a fresh [`RoundId`]. Only the most recently
//! issued id is current; anything produced under an older id is stale and must not
//! be written to visible state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque, strictly increasing identifier of one search round
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoundId(u64);

impl RoundId {
    /// Raw counter value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic fencing token for one search surface
#[derive(Debug, Default)]
pub struct RoundFence {
    current: AtomicU64,
}

impl RoundFence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new round id and make it current
    pub fn begin_round(&self) -> RoundId {
        RoundId(self.current.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Advance the token without starting a round
    ///
    /// Every round issued so far becomes stale.
    pub fn invalidate(&self) {
        self.current.fetch_add(1, Ordering::AcqRel);
    }

    /// Whether `round` is still the current round
    pub fn is_current(&self, round: RoundId) -> bool {
        self.current.load(Ordering::Acquire) == round.0
    }

    /// Most recently issued token value
    pub fn current(&self) -> u64 {
        self.current.load(Ordering::Acquire)
    }
}
