//! Validation stage: tool-using agent reviews metrics against raw statements.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{LlmPort, STATEMENT_TOOLS, StatementAccessor};
use crate::application::workflow::error::StageError;
use crate::application::workflow::prompts::validation_prompt;
use crate::application::workflow::stage::{Stage, StageContext, StageOutput};
use crate::domain::screening::{
    EntityMutation, Financials, StageTag, StatementKind, WorkflowEvent, flag_outliers,
    outlier_table,
};

/// Default timeout for LLM stages.
pub const DEFAULT_LLM_TIMEOUT: Duration = Duration::from_secs(180);

/// Read-only view of one entity's statements for the agent.
pub struct FinancialsAccessor {
    financials: Option<Arc<Financials>>,
}

impl FinancialsAccessor {
    /// Accessor over `financials`.
    #[must_use]
    pub const fn new(financials: Option<Arc<Financials>>) -> Self {
        Self { financials }
    }
}

impl StatementAccessor for FinancialsAccessor {
    fn render(&self, kind: StatementKind) -> String {
        match &self.financials {
            Some(f) if !f.statement(kind).is_empty() => f.statement(kind).to_markdown(),
            _ => format!("No {} data available.", kind.description()),
        }
    }
}

/// Runs the data validation agent.
pub struct ValidateStage<L>
where
    L: LlmPort + ?Sized,
{
    llm: Arc<L>,
    timeout: Duration,
}

impl<L> ValidateStage<L>
where
    L: LlmPort + ?Sized,
{
    /// Create a new validation stage.
    pub const fn new(llm: Arc<L>, timeout: Duration) -> Self {
        Self { llm, timeout }
    }

    fn emit(ctx: &StageContext, commentary: Option<String>, tool_calls: Vec<String>) -> StageOutput {
        StageOutput::then(
            EntityMutation::Validated {
                commentary,
                tool_calls,
            },
            WorkflowEvent::DataValidated {
                ticker: ctx.event.ticker().clone(),
            },
        )
    }
}

#[async_trait]
impl<L> Stage for ValidateStage<L>
where
    L: LlmPort + ?Sized + 'static,
{
    fn tag(&self) -> StageTag {
        StageTag::Validate
    }

    fn timeout(&self) -> Option<Duration> {
        Some(self.timeout)
    }

    async fn run(&self, ctx: &StageContext) -> Result<StageOutput, StageError> {
        let ticker = ctx.event.ticker();
        let metrics = ctx.entity.metrics();
        if metrics.is_empty() {
            tracing::debug!(ticker = %ticker, "No metrics, skipping validation");
            return Ok(Self::emit(ctx, None, Vec::new()));
        }

        let table = outlier_table(ctx.entity.sector_class());
        let flags = flag_outliers(metrics, table);
        let prompt = validation_prompt(metrics, table, &flags, &STATEMENT_TOOLS);
        let accessor = FinancialsAccessor::new(ctx.entity.financials().cloned());

        let run = self
            .llm
            .run_agent(&prompt, &STATEMENT_TOOLS, &accessor)
            .await?;

        tracing::info!(
            ticker = %ticker,
            outliers = flags.len(),
            tool_calls = ?run.tool_calls,
            "Data validation commentary written"
        );
        Ok(Self::emit(ctx, Some(run.text), run.tool_calls))
    }

    fn recover(&self, ctx: &StageContext, error: &StageError) -> StageOutput {
        tracing::warn!(
            ticker = %ctx.event.ticker(),
            error = %error,
            "Validation failed, continuing without commentary"
        );
        Self::emit(ctx, None, Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::screening::{Series, Statement};
    use chrono::NaiveDate;

    #[test]
    fn accessor_renders_present_and_missing_statements() {
        let year_end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let financials = Financials {
            annual_income: Statement::new([(
                "TotalRevenue",
                Series::from_points([(year_end, 100.0)]),
            )]),
            ..Financials::default()
        };
        let accessor = FinancialsAccessor::new(Some(Arc::new(financials)));
        assert!(accessor.render(StatementKind::AnnualIncome).contains("TotalRevenue"));
        assert!(
            accessor
                .render(StatementKind::QuarterlyBalanceSheet)
                .starts_with("No ")
        );

        let empty = FinancialsAccessor::new(None);
        assert!(empty.render(StatementKind::AnnualIncome).starts_with("No "));
    }
}
