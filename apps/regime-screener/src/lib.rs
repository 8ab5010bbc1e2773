// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::option_if_let_else,
        clippy::default_trait_access,
        clippy::items_after_statements,
        clippy::or_fun_call
    )
)]

//! Regime Screener - Rust Core Library
//!
//! Screens a list of tickers against a macro-economic regime. Each ticker
//! flows independently through fetch, routing, metric computation, LLM
//! validation and LLM evaluation; a single barrier joins them into one report.
//!
//! # Architecture (Clean Architecture + DDD + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Core business logic
//!   - `screening`: regimes, statements, metric calculators, router, criteria,
//!     outlier tables, per-ticker aggregate and workflow events
//!   - `shared`: identifiers and domain errors
//!
//! - **Application**: Use cases and orchestration
//!   - `ports`: `FinancialDataPort`, `LlmPort`
//!   - `workflow`: stage handlers, barrier, shared run state, engine
//!   - `use_cases`: `ScreenTickers`, `ScreenTicker`
//!   - `dto`: requests and the combined report
//!
//! - **Infrastructure**: Adapters (implementations)
//!   - `market_data`: fixture-file and in-memory providers
//!   - `llm`: OpenAI-compatible client, scripted client
//!   - `config`: dependency injection container
//!
//! Cross-cutting: [`config`] (YAML loading) and [`observability`] (tracing,
//! Prometheus metrics).

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core business logic with no external dependencies.
pub mod domain;

/// Application layer - Use cases, ports and the workflow engine.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

/// Configuration loading and validation.
pub mod config;

/// Logging and metrics.
pub mod observability;

// =============================================================================
// Re-exports from Clean Architecture
// =============================================================================

// Domain re-exports
pub use domain::screening::{
    EntityState, EntityStatus, Evaluation, Financials, MetricSet, MetricStage, Regime, Sector,
    StageTag, WorkflowEvent, route,
};
pub use domain::shared::{DomainError, RunId, Ticker};

// Application re-exports
pub use application::dto::{ScreeningReport, ScreeningRequestDto, TickerOutcome};
pub use application::ports::{DataProviderError, FinancialDataPort, LlmError, LlmPort};
pub use application::use_cases::{ScreenTickerUseCase, ScreenTickersUseCase};
pub use application::workflow::{EngineSettings, StageTimeouts, WorkflowEngine, WorkflowError};

// Infrastructure re-exports
pub use infrastructure::config::{Container, DynContainer};
pub use infrastructure::llm::{OpenAiClient, OpenAiConfig, ScriptedLlm};
pub use infrastructure::market_data::{FixtureDataProvider, InMemoryDataProvider};
