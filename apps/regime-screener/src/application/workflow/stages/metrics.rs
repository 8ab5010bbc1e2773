//! Metric stages: one handler per routed metric stage.

use async_trait::async_trait;

use crate::application::workflow::error::StageError;
use crate::application::workflow::stage::{Stage, StageContext, StageOutput};
use crate::domain::screening::{EntityMutation, MetricSet, StageTag, WorkflowEvent};

/// Computes the routed metric set for an entity.
///
/// One instance is registered per metric tag; the concrete formulas come
/// from the `MetricStage` carried by the `Routed` event.
#[derive(Debug, Clone, Copy)]
pub struct MetricsStage {
    tag: StageTag,
}

impl MetricsStage {
    /// Handler for `tag`.
    #[must_use]
    pub const fn new(tag: StageTag) -> Self {
        Self { tag }
    }

    /// Handlers for every metric tag.
    #[must_use]
    pub fn all() -> Vec<Self> {
        [
            StageTag::ExpansionMetrics,
            StageTag::InflationMetrics,
            StageTag::StagflationMetrics,
            StageTag::RecessionMetrics,
            StageTag::FinancialMetrics,
        ]
        .into_iter()
        .map(Self::new)
        .collect()
    }

    fn emit(ctx: &StageContext, metrics: MetricSet) -> StageOutput {
        StageOutput::then(
            EntityMutation::MetricsComputed { metrics },
            WorkflowEvent::MetricsComputed {
                ticker: ctx.event.ticker().clone(),
            },
        )
    }
}

#[async_trait]
impl Stage for MetricsStage {
    fn tag(&self) -> StageTag {
        self.tag
    }

    async fn run(&self, ctx: &StageContext) -> Result<StageOutput, StageError> {
        let WorkflowEvent::Routed { stage, .. } = &ctx.event else {
            return Err(StageError::Precondition(format!(
                "{} expects a ROUTED event, got {}",
                self.tag, ctx.event
            )));
        };
        if StageTag::for_metric_stage(*stage) != self.tag {
            return Err(StageError::Precondition(format!(
                "{stage} dispatched to {}",
                self.tag
            )));
        }

        let metrics = stage.compute(ctx.entity.financials().map(AsRef::as_ref));
        tracing::debug!(
            ticker = %ctx.event.ticker(),
            stage = %stage,
            count = metrics.len(),
            "Metrics computed"
        );
        Ok(Self::emit(ctx, metrics))
    }

    fn recover(&self, ctx: &StageContext, error: &StageError) -> StageOutput {
        tracing::warn!(ticker = %ctx.event.ticker(), error = %error, "Metric computation failed");
        Self::emit(ctx, MetricSet::empty())
    }
}
