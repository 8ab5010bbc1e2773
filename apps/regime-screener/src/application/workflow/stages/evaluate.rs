//! Evaluation stage: structured LLM scoring against regime criteria.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{LlmError, LlmPort, ResponseSchema};
use crate::application::workflow::error::StageError;
use crate::application::workflow::prompts::evaluation_prompt;
use crate::application::workflow::stage::{Stage, StageContext, StageOutput};
use crate::domain::screening::{EntityMutation, Evaluation, StageTag, WorkflowEvent, criteria_for};

/// Scores an entity's fit for the regime.
pub struct EvaluateStage<L>
where
    L: LlmPort + ?Sized,
{
    llm: Arc<L>,
    timeout: Duration,
}

impl<L> EvaluateStage<L>
where
    L: LlmPort + ?Sized,
{
    /// Create a new evaluation stage.
    pub const fn new(llm: Arc<L>, timeout: Duration) -> Self {
        Self { llm, timeout }
    }

    fn emit(ctx: &StageContext, evaluation: Evaluation) -> StageOutput {
        StageOutput::then(
            EntityMutation::Evaluated { evaluation },
            WorkflowEvent::Evaluated {
                ticker: ctx.event.ticker().clone(),
            },
        )
    }
}

/// Parse model output into an evaluation.
///
/// The output must be an object with a numeric `score`; the score is then
/// rounded and clamped by [`Evaluation`].
///
/// # Errors
///
/// Returns `LlmError::Malformed` when the shape is wrong.
pub fn parse_evaluation(value: Value) -> Result<Evaluation, LlmError> {
    if !value.get("score").is_some_and(Value::is_number) {
        return Err(LlmError::Malformed(format!(
            "expected {{explanation, score}}, got {value}"
        )));
    }
    serde_json::from_value(value).map_err(|e| LlmError::Malformed(e.to_string()))
}

#[async_trait]
impl<L> Stage for EvaluateStage<L>
where
    L: LlmPort + ?Sized + 'static,
{
    fn tag(&self) -> StageTag {
        StageTag::Evaluate
    }

    fn timeout(&self) -> Option<Duration> {
        Some(self.timeout)
    }

    async fn run(&self, ctx: &StageContext) -> Result<StageOutput, StageError> {
        let ticker = ctx.event.ticker();
        let metrics = ctx.entity.metrics();
        if metrics.is_empty() {
            tracing::info!(ticker = %ticker, "No metrics, recording default evaluation");
            return Ok(Self::emit(ctx, Evaluation::no_metrics()));
        }

        let criteria = criteria_for(ctx.regime, ctx.entity.sector_class());
        let prompt = evaluation_prompt(ctx.regime, metrics, criteria, ctx.entity.commentary());
        let raw = self
            .llm
            .complete_structured(&prompt, &ResponseSchema::evaluation())
            .await?;
        let evaluation = parse_evaluation(raw)?;

        tracing::info!(
            ticker = %ticker,
            regime = %ctx.regime,
            score = evaluation.score(),
            "Evaluation written"
        );
        Ok(Self::emit(ctx, evaluation))
    }

    fn recover(&self, ctx: &StageContext, error: &StageError) -> StageOutput {
        tracing::warn!(ticker = %ctx.event.ticker(), error = %error, "Evaluation degraded");
        Self::emit(ctx, Evaluation::degraded(error))
    }
}
