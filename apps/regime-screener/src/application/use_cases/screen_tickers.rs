//! Screen Tickers Use Case

use std::str::FromStr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::application::dto::{ScreeningReport, ScreeningRequestDto};
use crate::application::ports::{FinancialDataPort, LlmPort};
use crate::application::workflow::{EngineSettings, StageTimeouts, WorkflowEngine, WorkflowError};
use crate::domain::screening::Regime;
use crate::domain::shared::Ticker;

/// Parse and validate a raw request.
///
/// # Errors
///
/// Returns `WorkflowError::Configuration` for an unknown regime, an invalid
/// ticker or an empty ticker list.
pub fn parse_request(request: &ScreeningRequestDto) -> Result<(Regime, Vec<Ticker>), WorkflowError> {
    let regime = Regime::from_str(&request.regime)
        .map_err(|e| WorkflowError::Configuration(e.to_string()))?;
    let tickers = request
        .tickers
        .iter()
        .map(|t| Ticker::from_str(t))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| WorkflowError::Configuration(e.to_string()))?;
    if tickers.is_empty() {
        return Err(WorkflowError::Configuration(
            "at least one ticker is required".to_string(),
        ));
    }
    Ok((regime, tickers))
}

/// Use case for screening many tickers against one regime.
pub struct ScreenTickersUseCase {
    engine: Arc<WorkflowEngine>,
}

impl ScreenTickersUseCase {
    /// Create a new `ScreenTickersUseCase` over a configured engine.
    pub const fn new(engine: Arc<WorkflowEngine>) -> Self {
        Self { engine }
    }

    /// Create a use case with the standard pipeline over the given ports.
    pub fn from_ports<D, L>(
        provider: Arc<D>,
        llm: Arc<L>,
        timeouts: StageTimeouts,
        settings: EngineSettings,
    ) -> Self
    where
        D: FinancialDataPort + ?Sized + 'static,
        L: LlmPort + ?Sized + 'static,
    {
        Self::new(Arc::new(WorkflowEngine::standard(
            provider, llm, timeouts, settings,
        )))
    }

    /// Execute the use case.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid input (before any fetch) or cancellation.
    /// Per-ticker failures are reported inside the result.
    pub async fn execute(
        &self,
        request: &ScreeningRequestDto,
        cancel: &CancellationToken,
    ) -> Result<ScreeningReport, WorkflowError> {
        let (regime, tickers) = parse_request(request)?;
        self.engine.run(regime, tickers, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::llm::ScriptedLlm;
    use crate::infrastructure::market_data::InMemoryDataProvider;
    use test_case::test_case;

    fn use_case(llm: ScriptedLlm) -> ScreenTickersUseCase {
        ScreenTickersUseCase::from_ports(
            Arc::new(InMemoryDataProvider::with_samples()),
            Arc::new(llm),
            StageTimeouts::default(),
            EngineSettings::default(),
        )
    }

    #[test_case("Stagnation", "ACME" ; "unknown regime")]
    #[test_case("7", "ACME" ; "regime index out of range")]
    #[test_case("recession", "" ; "no tickers")]
    #[test_case("recession", "BRK A" ; "ticker with whitespace")]
    fn invalid_requests_are_configuration_errors(regime: &str, tickers: &str) {
        let request = ScreeningRequestDto {
            regime: regime.to_string(),
            tickers: if tickers.is_empty() {
                Vec::new()
            } else {
                vec![tickers.to_string()]
            },
        };
        assert!(matches!(
            parse_request(&request),
            Err(WorkflowError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn invalid_regime_makes_no_external_calls() {
        let llm = ScriptedLlm::new();
        let result = use_case(llm.clone())
            .execute(
                &ScreeningRequestDto::from_csv("Boom", "ACME"),
                &CancellationToken::new(),
            )
            .await;
        assert!(matches!(result, Err(WorkflowError::Configuration(_))));
        assert_eq!(llm.agent_calls() + llm.structured_calls(), 0);
    }

    #[tokio::test]
    async fn duplicate_tickers_are_screened_once() {
        let llm = ScriptedLlm::new().with_score(64);
        let report = use_case(llm.clone())
            .execute(
                &ScreeningRequestDto::from_csv("2", "acme,ACME,bankco"),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(report.regime, Regime::Stagflation);
        assert_eq!(report.tickers, vec![Ticker::new("ACME"), Ticker::new("BANKCO")]);
        assert_eq!(llm.structured_calls(), 2);
        assert!(report.evaluations.values().all(|e| e.as_ref().map(|e| e.score()) == Some(64)));
    }
}
