//! Screen Ticker Use Case
//!
//! The single-entity pipeline: the same stages with a barrier of one.

use std::str::FromStr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::application::dto::TickerOutcome;
use crate::application::workflow::{WorkflowEngine, WorkflowError};
use crate::domain::screening::Regime;
use crate::domain::shared::Ticker;

/// Use case for screening a single ticker.
pub struct ScreenTickerUseCase {
    engine: Arc<WorkflowEngine>,
}

impl ScreenTickerUseCase {
    /// Create a new `ScreenTickerUseCase`.
    pub const fn new(engine: Arc<WorkflowEngine>) -> Self {
        Self { engine }
    }

    /// Execute the use case.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::Configuration` for an invalid regime or ticker
    /// and `WorkflowError::Cancelled` on cancellation.
    pub async fn execute(
        &self,
        regime: &str,
        ticker: &str,
        cancel: &CancellationToken,
    ) -> Result<TickerOutcome, WorkflowError> {
        let regime =
            Regime::from_str(regime).map_err(|e| WorkflowError::Configuration(e.to_string()))?;
        let ticker =
            Ticker::from_str(ticker).map_err(|e| WorkflowError::Configuration(e.to_string()))?;

        let report = self.engine.run(regime, vec![ticker.clone()], cancel).await?;

        let has_metrics = report.metrics_for(&ticker).is_some_and(|m| !m.is_empty());
        match report.evaluation(&ticker) {
            Some(evaluation) if has_metrics => Ok(TickerOutcome::Evaluated(evaluation.clone())),
            _ => Ok(TickerOutcome::no_data(&ticker)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::workflow::{EngineSettings, StageTimeouts};
    use crate::infrastructure::llm::ScriptedLlm;
    use crate::infrastructure::market_data::InMemoryDataProvider;

    fn use_case(llm: ScriptedLlm) -> ScreenTickerUseCase {
        ScreenTickerUseCase::new(Arc::new(WorkflowEngine::standard(
            Arc::new(InMemoryDataProvider::with_samples()),
            Arc::new(llm),
            StageTimeouts::default(),
            EngineSettings::default(),
        )))
    }

    #[tokio::test]
    async fn known_ticker_is_evaluated() {
        let llm = ScriptedLlm::new().with_score(81);
        let outcome = use_case(llm.clone())
            .execute("expansionary", "acme", &CancellationToken::new())
            .await
            .unwrap();
        let TickerOutcome::Evaluated(evaluation) = outcome else {
            panic!("expected an evaluation, got {outcome:?}");
        };
        assert_eq!(evaluation.score(), 81);
        assert_eq!(llm.agent_calls(), 1);
    }

    #[tokio::test]
    async fn unknown_ticker_yields_no_data_message() {
        let llm = ScriptedLlm::new();
        let outcome = use_case(llm.clone())
            .execute("0", "NOPE", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(
            outcome,
            TickerOutcome::NoData(
                "No financial metrics available for evaluation (Ticker: NOPE).".to_string()
            )
        );
        assert_eq!(llm.agent_calls() + llm.structured_calls(), 0);
    }
}
