//! Per-entity pipeline status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of an entity in the screening pipeline.
///
/// Status advances one step at a time. `Done` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityStatus {
    /// Seeded, nothing fetched yet.
    Pending,
    /// Fetch finished (successfully or not).
    Fetched,
    /// Metric stage selected.
    Routed,
    /// Metrics written.
    MetricsComputed,
    /// Validation commentary written (possibly empty).
    Validated,
    /// Evaluation written.
    Evaluated,
    /// Counted by the barrier.
    Done,
}

impl EntityStatus {
    /// Returns true if the entity reached the terminal state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// The status that immediately follows this one, if any.
    #[must_use]
    pub const fn successor(&self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::Fetched),
            Self::Fetched => Some(Self::Routed),
            Self::Routed => Some(Self::MetricsComputed),
            Self::MetricsComputed => Some(Self::Validated),
            Self::Validated => Some(Self::Evaluated),
            Self::Evaluated => Some(Self::Done),
            Self::Done => None,
        }
    }

    /// Returns true if `next` is the immediate successor of this status.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.successor() == Some(next)
    }
}

impl fmt::Display for EntityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Fetched => write!(f, "FETCHED"),
            Self::Routed => write!(f, "ROUTED"),
            Self::MetricsComputed => write!(f, "METRICS_COMPUTED"),
            Self::Validated => write!(f, "VALIDATED"),
            Self::Evaluated => write!(f, "EVALUATED"),
            Self::Done => write!(f, "DONE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_done_is_terminal() {
        assert!(EntityStatus::Done.is_terminal());
        assert!(!EntityStatus::Evaluated.is_terminal());
    }

    #[test]
    fn advances_one_step_at_a_time() {
        assert!(EntityStatus::Pending.can_transition_to(EntityStatus::Fetched));
        assert!(EntityStatus::Evaluated.can_transition_to(EntityStatus::Done));
        assert!(!EntityStatus::Routed.can_transition_to(EntityStatus::Done));
        assert!(!EntityStatus::Pending.can_transition_to(EntityStatus::Evaluated));
        assert!(!EntityStatus::Validated.can_transition_to(EntityStatus::Routed));
        assert!(!EntityStatus::Done.can_transition_to(EntityStatus::Done));
    }

    #[test]
    fn successors_follow_declaration_order() {
        let mut status = EntityStatus::Pending;
        let mut steps = 0;
        while let Some(next) = status.successor() {
            assert!(next > status);
            status = next;
            steps += 1;
        }
        assert_eq!(status, EntityStatus::Done);
        assert_eq!(steps, 6);
    }
}
