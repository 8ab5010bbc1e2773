//! Regime router.
//!
//! Maps (regime, sector) to exactly one metric stage.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::metrics::{
    expansion_metrics, financial_metrics, inflation_metrics, recession_metrics,
    stagflation_metrics,
};
use crate::domain::screening::value_objects::{Financials, MetricSet, Regime, Sector, SectorClass};

/// The metric stage an entity is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "stage", content = "regime", rename_all = "snake_case")]
pub enum MetricStage {
    /// Operating-company expansion metrics.
    Expansion,
    /// Operating-company inflation metrics.
    Inflation,
    /// Operating-company stagflation metrics.
    Stagflation,
    /// Operating-company recession metrics.
    Recession,
    /// Bank metrics, branching on the regime.
    Financial(Regime),
}

impl MetricStage {
    /// Compute this stage's metrics. No financials means an empty set.
    #[must_use]
    pub fn compute(&self, financials: Option<&Financials>) -> MetricSet {
        let Some(fin) = financials else {
            return MetricSet::empty();
        };
        match self {
            Self::Expansion => expansion_metrics(fin),
            Self::Inflation => inflation_metrics(fin),
            Self::Stagflation => stagflation_metrics(fin),
            Self::Recession => recession_metrics(fin),
            Self::Financial(regime) => financial_metrics(*regime, fin),
        }
    }
}

impl fmt::Display for MetricStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expansion => write!(f, "expansion_metrics"),
            Self::Inflation => write!(f, "inflation_metrics"),
            Self::Stagflation => write!(f, "stagflation_metrics"),
            Self::Recession => write!(f, "recession_metrics"),
            Self::Financial(regime) => write!(f, "financial_metrics[{regime}]"),
        }
    }
}

/// Pick the metric stage for an entity.
///
/// "Financial Services" always goes to the bank stage; every other sector,
/// including an unknown one, goes to the operating-company stage for the regime.
#[must_use]
pub fn route(regime: Regime, sector: Option<&Sector>) -> MetricStage {
    match (SectorClass::of(sector), regime) {
        (SectorClass::Financial, regime) => MetricStage::Financial(regime),
        (SectorClass::NonFinancial, Regime::Expansion) => MetricStage::Expansion,
        (SectorClass::NonFinancial, Regime::Inflation) => MetricStage::Inflation,
        (SectorClass::NonFinancial, Regime::Stagflation) => MetricStage::Stagflation,
        (SectorClass::NonFinancial, Regime::Recession) => MetricStage::Recession,
    }
}
