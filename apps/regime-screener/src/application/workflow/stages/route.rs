//! Route stage: pick the metric stage from regime and sector.

use async_trait::async_trait;

use crate::application::workflow::error::StageError;
use crate::application::workflow::stage::{Stage, StageContext, StageOutput};
use crate::domain::screening::{EntityMutation, StageTag, WorkflowEvent, route};

/// Routes an entity to exactly one metric stage.
#[derive(Debug, Default, Clone, Copy)]
pub struct RouteStage;

impl RouteStage {
    fn output(ctx: &StageContext) -> StageOutput {
        let stage = route(ctx.regime, ctx.entity.sector());
        StageOutput::then(
            EntityMutation::Routed { stage },
            WorkflowEvent::Routed {
                ticker: ctx.event.ticker().clone(),
                stage,
            },
        )
    }
}

#[async_trait]
impl Stage for RouteStage {
    fn tag(&self) -> StageTag {
        StageTag::Route
    }

    async fn run(&self, ctx: &StageContext) -> Result<StageOutput, StageError> {
        let output = Self::output(ctx);
        tracing::debug!(ticker = %ctx.event.ticker(), next = ?output.next, "Routed");
        Ok(output)
    }

    fn recover(&self, ctx: &StageContext, _error: &StageError) -> StageOutput {
        Self::output(ctx)
    }
}
