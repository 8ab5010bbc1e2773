//! Dependency Injection Container
//!
//! Manages creation and wiring of the screening components.

use std::path::PathBuf;
use std::sync::Arc;

use crate::application::ports::{FinancialDataPort, LlmError, LlmPort};
use crate::application::use_cases::{ScreenTickerUseCase, ScreenTickersUseCase};
use crate::application::workflow::{EngineSettings, StageTimeouts, WorkflowEngine};
use crate::config::{Config, DataProviderKind, LlmProviderKind};
use crate::infrastructure::llm::{OpenAiClient, ScriptedLlm};
use crate::infrastructure::market_data::{FixtureDataProvider, InMemoryDataProvider};

/// Errors raised while wiring adapters.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    /// The language model client could not be built.
    #[error("failed to build LLM client: {0}")]
    Llm(#[from] LlmError),
}

/// Dependency injection container.
///
/// Holds the wired ports and the engine built over them. Both use cases share
/// one engine.
pub struct Container<D, L>
where
    D: FinancialDataPort + ?Sized + 'static,
    L: LlmPort + ?Sized + 'static,
{
    provider: Arc<D>,
    llm: Arc<L>,
    engine: Arc<WorkflowEngine>,
}

/// Container over trait objects, as built from configuration.
pub type DynContainer = Container<dyn FinancialDataPort, dyn LlmPort>;

impl<D, L> Container<D, L>
where
    D: FinancialDataPort + ?Sized + 'static,
    L: LlmPort + ?Sized + 'static,
{
    /// Create a new container with all dependencies.
    pub fn new(
        provider: Arc<D>,
        llm: Arc<L>,
        timeouts: StageTimeouts,
        settings: EngineSettings,
    ) -> Self {
        let engine = Arc::new(WorkflowEngine::standard(
            Arc::clone(&provider),
            Arc::clone(&llm),
            timeouts,
            settings,
        ));
        Self {
            provider,
            llm,
            engine,
        }
    }

    /// Get the financial data port.
    pub fn provider(&self) -> Arc<D> {
        Arc::clone(&self.provider)
    }

    /// Get the language model port.
    pub fn llm(&self) -> Arc<L> {
        Arc::clone(&self.llm)
    }

    /// Get the shared engine.
    pub fn engine(&self) -> Arc<WorkflowEngine> {
        Arc::clone(&self.engine)
    }

    /// Create a `ScreenTickersUseCase`.
    pub fn screen_tickers_use_case(&self) -> ScreenTickersUseCase {
        ScreenTickersUseCase::new(Arc::clone(&self.engine))
    }

    /// Create a `ScreenTickerUseCase`.
    pub fn screen_ticker_use_case(&self) -> ScreenTickerUseCase {
        ScreenTickerUseCase::new(Arc::clone(&self.engine))
    }
}

impl DynContainer {
    /// Wire the adapters selected in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the OpenAI client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, ContainerError> {
        let provider: Arc<dyn FinancialDataPort> = match config.provider.kind {
            DataProviderKind::Fixture => Arc::new(FixtureDataProvider::new(PathBuf::from(
                &config.provider.fixture_dir,
            ))),
            DataProviderKind::InMemory => Arc::new(InMemoryDataProvider::with_samples()),
        };

        let llm: Arc<dyn LlmPort> = match config.llm.provider {
            LlmProviderKind::Openai => Arc::new(OpenAiClient::new(config.llm.openai())?),
            LlmProviderKind::Scripted => Arc::new(ScriptedLlm::default()),
        };

        tracing::info!(
            provider = ?config.provider.kind,
            llm = ?config.llm.provider,
            concurrency = config.engine.default_concurrency,
            "Container wired"
        );

        Ok(Self::new(
            provider,
            llm,
            config.engine.timeouts(),
            config.engine.settings(),
        ))
    }
}
