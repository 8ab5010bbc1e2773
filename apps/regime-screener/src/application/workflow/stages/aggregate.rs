//! Aggregate stage: hand the entity to the barrier.

use async_trait::async_trait;

use crate::application::workflow::error::StageError;
use crate::application::workflow::stage::{Stage, StageContext, StageOutput};
use crate::domain::screening::{EntityMutation, StageTag};

/// Emits the completion mutation; the engine's commit feeds the barrier.
#[derive(Debug, Default, Clone, Copy)]
pub struct AggregateStage;

#[async_trait]
impl Stage for AggregateStage {
    fn tag(&self) -> StageTag {
        StageTag::Aggregate
    }

    async fn run(&self, _ctx: &StageContext) -> Result<StageOutput, StageError> {
        Ok(StageOutput::last(EntityMutation::Completed))
    }

    fn recover(&self, _ctx: &StageContext, _error: &StageError) -> StageOutput {
        StageOutput::last(EntityMutation::Completed)
    }
}
