//! Fetch stage: pull sector and statements from the data provider.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::FinancialDataPort;
use crate::application::workflow::error::StageError;
use crate::application::workflow::stage::{Stage, StageContext, StageOutput};
use crate::domain::screening::{EntityMutation, StageTag, WorkflowEvent};

/// Default fetch timeout.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Fetches one ticker's financials.
pub struct FetchStage<D>
where
    D: FinancialDataPort + ?Sized,
{
    provider: Arc<D>,
    timeout: Duration,
}

impl<D> FetchStage<D>
where
    D: FinancialDataPort + ?Sized,
{
    /// Create a new fetch stage.
    pub const fn new(provider: Arc<D>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }
}

#[async_trait]
impl<D> Stage for FetchStage<D>
where
    D: FinancialDataPort + ?Sized + 'static,
{
    fn tag(&self) -> StageTag {
        StageTag::Fetch
    }

    fn timeout(&self) -> Option<Duration> {
        Some(self.timeout)
    }

    async fn run(&self, ctx: &StageContext) -> Result<StageOutput, StageError> {
        let ticker = ctx.event.ticker();
        let fetched = self.provider.fetch(ticker).await?;

        tracing::debug!(
            ticker = %ticker,
            sector = %fetched.sector,
            "Financials fetched"
        );

        Ok(StageOutput::then(
            EntityMutation::Fetched {
                sector: fetched.sector,
                financials: Arc::new(fetched.financials),
            },
            WorkflowEvent::FinancialsFetched {
                ticker: ticker.clone(),
            },
        ))
    }

    fn recover(&self, ctx: &StageContext, error: &StageError) -> StageOutput {
        let ticker = ctx.event.ticker();
        tracing::warn!(ticker = %ticker, error = %error, "Fetch failed, continuing without data");

        StageOutput::then(
            EntityMutation::FetchFailed {
                reason: error.to_string(),
            },
            WorkflowEvent::FinancialsFetched {
                ticker: ticker.clone(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{DataProviderError, FetchedFinancials};
    use crate::domain::screening::{EntityState, Regime};
    use crate::domain::shared::{RunId, Ticker};
    use crate::infrastructure::market_data::samples;
    use mockall::mock;
    use mockall::predicate::eq;

    mock! {
        Provider {}

        #[async_trait]
        impl FinancialDataPort for Provider {
            async fn fetch(&self, ticker: &Ticker) -> Result<FetchedFinancials, DataProviderError>;
        }
    }

    fn context(ticker: &str) -> StageContext {
        let ticker = Ticker::new(ticker);
        StageContext {
            run_id: RunId::new("run-1"),
            regime: Regime::Recession,
            event: WorkflowEvent::ProcessTicker {
                ticker: ticker.clone(),
            },
            entity: EntityState::new(ticker),
        }
    }

    #[tokio::test]
    async fn fetches_once_and_emits_fetched_event() {
        let mut provider = MockProvider::new();
        provider
            .expect_fetch()
            .with(eq(Ticker::new("ACME")))
            .times(1)
            .returning(|_| Ok(samples::industrial()));
        let stage = FetchStage::new(Arc::new(provider), DEFAULT_FETCH_TIMEOUT);

        let output = stage.run(&context("ACME")).await.unwrap();

        assert!(matches!(output.mutation, EntityMutation::Fetched { .. }));
        assert_eq!(
            output.next,
            Some(WorkflowEvent::FinancialsFetched {
                ticker: Ticker::new("ACME")
            })
        );
    }

    #[tokio::test]
    async fn provider_error_is_recovered_as_fetch_failure() {
        let mut provider = MockProvider::new();
        provider.expect_fetch().times(1).returning(|t| {
            Err(DataProviderError::UnknownTicker {
                ticker: t.to_string(),
            })
        });
        let stage = FetchStage::new(Arc::new(provider), DEFAULT_FETCH_TIMEOUT);
        let ctx = context("GHOST");

        let error = stage.run(&ctx).await.unwrap_err();
        let output = stage.recover(&ctx, &error);

        match output.mutation {
            EntityMutation::FetchFailed { reason } => assert!(reason.contains("GHOST")),
            other => panic!("expected FetchFailed, got {other:?}"),
        }
        assert!(matches!(
            output.next,
            Some(WorkflowEvent::FinancialsFetched { .. })
        ));
    }
}
