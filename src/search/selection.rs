//! Keyboard selection state machine.
//!
//! This module handles phase transitions of the result dropdown. It knows nothing
//! about rounds or the network: callers feed it term changes, admitted outcomes and
//! key presses.

use crate::search::outcome::RoundOutcome;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Visible phase of the result dropdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum SelectionPhase {
    /// Nothing shown
    #[default]
    Closed,
    /// Waiting for a round to be admitted
    OpenLoading,
    /// Every collection failed
    OpenError,
    /// Round admitted with no results
    OpenEmpty,
    /// Results shown with one highlighted
    OpenResults { highlighted: usize },
}

/// Navigation keys the dropdown reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    ArrowDown,
    ArrowUp,
    Enter,
    Escape,
}

/// What a key press asks the owner to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEffect {
    /// Nothing changed
    Ignored,
    /// Highlight moved to this index
    Moved(usize),
    /// Select the result at this index; the term must then be cleared
    Select(usize),
    /// Hide results and errors but keep the term
    Dismiss,
}

impl SelectionPhase {
    /// Whether the dropdown is visible
    pub fn is_open(&self) -> bool {
        !matches!(self, SelectionPhase::Closed)
    }

    /// Highlighted index, only in [`SelectionPhase::OpenResults`]
    pub fn highlighted(&self) -> Option<usize> {
        match self {
            SelectionPhase::OpenResults { highlighted } => Some(*highlighted),
            _ => None,
        }
    }

    /// React to the trimmed term changing
    pub fn on_term_changed(&mut self, term_is_empty: bool) {
        *self = if term_is_empty {
            SelectionPhase::Closed
        } else {
            SelectionPhase::OpenLoading
        };
    }

    /// React to a round being admitted
    pub fn on_round_admitted(&mut self, outcome: RoundOutcome, result_count: usize) {
        *self = match outcome {
            RoundOutcome::TotalFailure => SelectionPhase::OpenError,
            _ if result_count == 0 => SelectionPhase::OpenEmpty,
            _ => SelectionPhase::OpenResults { highlighted: 0 },
        };
    }

    /// React to a navigation key given the current number of results
    pub fn on_key(&mut self, key: NavKey, result_count: usize) -> KeyEffect {
        match (key, *self) {
            (NavKey::Escape, phase) if phase.is_open() => {
                *self = SelectionPhase::Closed;
                KeyEffect::Dismiss
            }
            (_, SelectionPhase::OpenResults { .. }) if result_count == 0 => KeyEffect::Ignored,
            (NavKey::ArrowDown, SelectionPhase::OpenResults { highlighted }) => {
                let next = (highlighted + 1) % result_count;
                *self = SelectionPhase::OpenResults { highlighted: next };
                KeyEffect::Moved(next)
            }
            (NavKey::ArrowUp, SelectionPhase::OpenResults { highlighted }) => {
                let next = (highlighted + result_count - 1) % result_count;
                *self = SelectionPhase::OpenResults { highlighted: next };
                KeyEffect::Moved(next)
            }
            (NavKey::Enter, SelectionPhase::OpenResults { highlighted }) => {
                let index = if highlighted < result_count { highlighted } else { 0 };
                *self = SelectionPhase::Closed;
                KeyEffect::Select(index)
            }
            _ => KeyEffect::Ignored,
        }
    }
}

impl fmt::Display for SelectionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionPhase::Closed => write!(f, "closed"),
            SelectionPhase::OpenLoading => write!(f, "open-loading"),
            SelectionPhase::OpenError => write!(f, "open-error"),
            SelectionPhase::OpenEmpty => write!(f, "open-empty"),
            SelectionPhase::OpenResults { highlighted } => {
                write!(f, "open-results({})", highlighted)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results(highlighted: usize) -> SelectionPhase {
        SelectionPhase::OpenResults { highlighted }
    }

    #[test]
    fn test_term_changes() {
        let mut phase = SelectionPhase::Closed;
        phase.on_term_changed(false);
        assert_eq!(phase, SelectionPhase::OpenLoading);
        phase.on_term_changed(true);
        assert_eq!(phase, SelectionPhase::Closed);
    }

    #[test]
    fn test_round_admission() {
        let mut phase = SelectionPhase::OpenLoading;
        phase.on_round_admitted(RoundOutcome::TotalFailure, 0);
        assert_eq!(phase, SelectionPhase::OpenError);

        phase.on_round_admitted(RoundOutcome::Success, 0);
        assert_eq!(phase, SelectionPhase::OpenEmpty);

        phase.on_round_admitted(RoundOutcome::PartialFailure, 0);
        assert_eq!(phase, SelectionPhase::OpenEmpty);

        phase.on_round_admitted(RoundOutcome::PartialFailure, 2);
        assert_eq!(phase, results(0));
    }

    #[test]
    fn test_arrow_down_wraps() {
        let mut phase = results(2);
        assert_eq!(phase.on_key(NavKey::ArrowDown, 3), KeyEffect::Moved(0));
        assert_eq!(phase.highlighted(), Some(0));
    }

    #[test]
    fn test_arrow_up_wraps() {
        let mut phase = results(0);
        assert_eq!(phase.on_key(NavKey::ArrowUp, 3), KeyEffect::Moved(2));
        assert_eq!(phase.on_key(NavKey::ArrowUp, 3), KeyEffect::Moved(1));
    }

    #[test]
    fn test_arrows_ignored_outside_results() {
        for mut phase in [
            SelectionPhase::Closed,
            SelectionPhase::OpenLoading,
            SelectionPhase::OpenError,
            SelectionPhase::OpenEmpty,
        ] {
            let before = phase;
            assert_eq!(phase.on_key(NavKey::ArrowDown, 0), KeyEffect::Ignored);
            assert_eq!(phase.on_key(NavKey::ArrowUp, 0), KeyEffect::Ignored);
            assert_eq!(phase.on_key(NavKey::Enter, 0), KeyEffect::Ignored);
            assert_eq!(phase, before);
        }
    }

    #[test]
    fn test_enter_selects_highlighted_and_closes() {
        let mut phase = results(1);
        assert_eq!(phase.on_key(NavKey::Enter, 3), KeyEffect::Select(1));
        assert_eq!(phase, SelectionPhase::Closed);
    }

    #[test]
    fn test_enter_with_out_of_range_highlight_selects_first() {
        let mut phase = results(5);
        assert_eq!(phase.on_key(NavKey::Enter, 2), KeyEffect::Select(0));
    }

    #[test]
    fn test_escape_dismisses_any_open_phase() {
        for mut phase in [
            SelectionPhase::OpenLoading,
            SelectionPhase::OpenError,
            SelectionPhase::OpenEmpty,
            results(1),
        ] {
            assert_eq!(phase.on_key(NavKey::Escape, 2), KeyEffect::Dismiss);
            assert_eq!(phase, SelectionPhase::Closed);
        }

        let mut closed = SelectionPhase::Closed;
        assert_eq!(closed.on_key(NavKey::Escape, 0), KeyEffect::Ignored);
    }
}
