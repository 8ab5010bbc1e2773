//! Workflow events.
//!
//! Each event names one entity and the stage transition it just completed.
//! The engine dispatches an event to the stage returned by
//! [`WorkflowEvent::target_stage`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::screening::services::MetricStage;
use crate::domain::shared::Ticker;

/// All events that drive one entity through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowEvent {
    /// Seed event: start processing a ticker.
    ProcessTicker {
        /// Entity.
        ticker: Ticker,
    },
    /// Fetch finished (with or without data).
    FinancialsFetched {
        /// Entity.
        ticker: Ticker,
    },
    /// Router picked a metric stage.
    Routed {
        /// Entity.
        ticker: Ticker,
        /// Selected stage.
        stage: MetricStage,
    },
    /// Metrics written.
    MetricsComputed {
        /// Entity.
        ticker: Ticker,
    },
    /// Validation commentary written.
    DataValidated {
        /// Entity.
        ticker: Ticker,
    },
    /// Evaluation written; the entity is ready for the barrier.
    Evaluated {
        /// Entity.
        ticker: Ticker,
    },
}

impl WorkflowEvent {
    /// Get the ticker for this event.
    #[must_use]
    pub const fn ticker(&self) -> &Ticker {
        match self {
            Self::ProcessTicker { ticker }
            | Self::FinancialsFetched { ticker }
            | Self::Routed { ticker, .. }
            | Self::MetricsComputed { ticker }
            | Self::DataValidated { ticker }
            | Self::Evaluated { ticker } => ticker,
        }
    }

    /// Get the event type name.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::ProcessTicker { .. } => "PROCESS_TICKER",
            Self::FinancialsFetched { .. } => "FINANCIALS_FETCHED",
            Self::Routed { .. } => "ROUTED",
            Self::MetricsComputed { .. } => "METRICS_COMPUTED",
            Self::DataValidated { .. } => "DATA_VALIDATED",
            Self::Evaluated { .. } => "EVALUATED",
        }
    }

    /// The stage that consumes this event.
    #[must_use]
    pub const fn target_stage(&self) -> StageTag {
        match self {
            Self::ProcessTicker { .. } => StageTag::Fetch,
            Self::FinancialsFetched { .. } => StageTag::Route,
            Self::Routed { stage, .. } => StageTag::for_metric_stage(*stage),
            Self::MetricsComputed { .. } => StageTag::Validate,
            Self::DataValidated { .. } => StageTag::Evaluate,
            Self::Evaluated { .. } => StageTag::Aggregate,
        }
    }
}

impl fmt::Display for WorkflowEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.event_type(), self.ticker())
    }
}

/// Identifies a stage handler in the engine's dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageTag {
    /// Pull financial statements.
    Fetch,
    /// Choose the metric stage.
    Route,
    /// Operating-company expansion metrics.
    ExpansionMetrics,
    /// Operating-company inflation metrics.
    InflationMetrics,
    /// Operating-company stagflation metrics.
    StagflationMetrics,
    /// Operating-company recession metrics.
    RecessionMetrics,
    /// Bank metrics.
    FinancialMetrics,
    /// Data validation agent.
    Validate,
    /// Regime-fit evaluation.
    Evaluate,
    /// Fan-in barrier.
    Aggregate,
}

impl StageTag {
    /// Every stage, in pipeline order.
    pub const ALL: [Self; 10] = [
        Self::Fetch,
        Self::Route,
        Self::ExpansionMetrics,
        Self::InflationMetrics,
        Self::StagflationMetrics,
        Self::RecessionMetrics,
        Self::FinancialMetrics,
        Self::Validate,
        Self::Evaluate,
        Self::Aggregate,
    ];

    /// Tag of the handler for a routed metric stage.
    #[must_use]
    pub const fn for_metric_stage(stage: MetricStage) -> Self {
        match stage {
            MetricStage::Expansion => Self::ExpansionMetrics,
            MetricStage::Inflation => Self::InflationMetrics,
            MetricStage::Stagflation => Self::StagflationMetrics,
            MetricStage::Recession => Self::RecessionMetrics,
            MetricStage::Financial(_) => Self::FinancialMetrics,
        }
    }

    /// Stable name used in logs and metrics labels.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Route => "route",
            Self::ExpansionMetrics => "expansion_metrics",
            Self::InflationMetrics => "inflation_metrics",
            Self::StagflationMetrics => "stagflation_metrics",
            Self::RecessionMetrics => "recession_metrics",
            Self::FinancialMetrics => "financial_metrics",
            Self::Validate => "validate",
            Self::Evaluate => "evaluate",
            Self::Aggregate => "aggregate",
        }
    }
}

impl fmt::Display for StageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
