//! Workflow errors.

use std::time::Duration;

use crate::application::ports::{DataProviderError, LlmError};
use crate::domain::screening::StageTag;
use crate::domain::shared::DomainError;

/// Failure inside one stage handler.
///
/// Never escapes the engine: each stage turns it into degraded output.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StageError {
    /// Data provider failure.
    #[error(transparent)]
    Data(#[from] DataProviderError),

    /// LLM failure.
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// The handler exceeded its timeout.
    #[error("Stage '{stage}' timed out after {}s", timeout.as_secs())]
    Timeout {
        /// Stage that timed out.
        stage: StageTag,
        /// Timeout that elapsed.
        timeout: Duration,
    },

    /// The handler panicked.
    #[error("Stage '{stage}' panicked: {message}")]
    Panicked {
        /// Stage that panicked.
        stage: StageTag,
        /// Panic payload, if it was a string.
        message: String,
    },

    /// The entity snapshot did not satisfy the stage's preconditions.
    #[error("Stage precondition failed: {0}")]
    Precondition(String),
}

impl StageError {
    /// Short label for metrics.
    #[must_use]
    pub const fn outcome(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Panicked { .. } => "panic",
            Self::Data(_) | Self::Llm(_) | Self::Precondition(_) => "error",
        }
    }
}

/// Errors that abort a run.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// Invalid run input (unknown regime, empty ticker list).
    #[error("Invalid run configuration: {0}")]
    Configuration(String),

    /// The dispatch table has no handler for a stage.
    #[error("No handler registered for stage '{0}'")]
    MissingStage(StageTag),

    /// The run was cancelled.
    #[error("Run cancelled")]
    Cancelled,

    /// No work left in flight but the barrier never finalized.
    #[error("Run stalled with {pending} entities unfinished")]
    Stalled {
        /// Entities not yet done.
        pending: usize,
    },

    /// A completion named a ticker outside the run.
    #[error("Ticker {0} is not part of this run")]
    UnknownEntity(String),

    /// Domain invariant broken while committing a mutation.
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl WorkflowError {
    /// Short label for metrics.
    #[must_use]
    pub const fn outcome(&self) -> &'static str {
        match self {
            Self::Cancelled => "cancelled",
            Self::Configuration(_) | Self::MissingStage(_) => "invalid",
            Self::Stalled { .. } | Self::UnknownEntity(_) | Self::Domain(_) => "failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_names_stage_and_seconds() {
        let err = StageError::Timeout {
            stage: StageTag::Evaluate,
            timeout: Duration::from_secs(180),
        };
        assert_eq!(err.to_string(), "Stage 'evaluate' timed out after 180s");
        assert_eq!(err.outcome(), "timeout");
    }

    #[test]
    fn port_errors_convert_transparently() {
        let err: StageError = DataProviderError::UnknownTicker {
            ticker: "ZZZ".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Unknown ticker: ZZZ");
    }
}
