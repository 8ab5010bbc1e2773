//! Stage handler contract.

use async_trait::async_trait;
use std::time::Duration;

use super::error::StageError;
use crate::domain::screening::{EntityMutation, EntityState, Regime, StageTag, WorkflowEvent};
use crate::domain::shared::RunId;

/// Read-only input to a stage invocation.
#[derive(Debug, Clone)]
pub struct StageContext {
    /// Run this invocation belongs to.
    pub run_id: RunId,
    /// Regime being screened.
    pub regime: Regime,
    /// Event that triggered the invocation.
    pub event: WorkflowEvent,
    /// Snapshot of the entity taken at dispatch time.
    pub entity: EntityState,
}

/// What a stage hands back to the engine.
#[derive(Debug, Clone)]
pub struct StageOutput {
    /// Change to commit to the entity.
    pub mutation: EntityMutation,
    /// Event to enqueue after the commit, if any.
    pub next: Option<WorkflowEvent>,
}

impl StageOutput {
    /// Output that commits `mutation` and then emits `next`.
    #[must_use]
    pub const fn then(mutation: EntityMutation, next: WorkflowEvent) -> Self {
        Self {
            mutation,
            next: Some(next),
        }
    }

    /// Output that commits `mutation` and ends the entity's event chain.
    #[must_use]
    pub const fn last(mutation: EntityMutation) -> Self {
        Self {
            mutation,
            next: None,
        }
    }
}

/// One pipeline step.
///
/// Stages compute from a snapshot and return a mutation; they never touch
/// shared run state. `recover` must be infallible so that every entity
/// reaches the barrier.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Dispatch-table key.
    fn tag(&self) -> StageTag;

    /// Upper bound on one `run`; `None` for purely local stages.
    fn timeout(&self) -> Option<Duration> {
        None
    }

    /// Execute the stage.
    async fn run(&self, ctx: &StageContext) -> Result<StageOutput, StageError>;

    /// Degraded output used when `run` fails, times out or panics.
    fn recover(&self, ctx: &StageContext, error: &StageError) -> StageOutput;
}
