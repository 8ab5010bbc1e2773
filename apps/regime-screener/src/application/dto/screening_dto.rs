//! Screening DTOs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::screening::{Evaluation, MetricSet, Regime};
use crate::domain::shared::Ticker;

/// Raw run request, as typed by a user or read from a CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningRequestDto {
    /// Regime by name, adjective or index.
    pub regime: String,
    /// Ticker symbols.
    pub tickers: Vec<String>,
}

impl ScreeningRequestDto {
    /// Build a request from a regime and a comma-separated ticker list.
    #[must_use]
    pub fn from_csv(regime: impl Into<String>, tickers: &str) -> Self {
        Self {
            regime: regime.into(),
            tickers: tickers
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

/// Combined result of a multi-entity run.
///
/// `evaluations` and `metrics` always carry one key per ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningReport {
    /// Regime screened against.
    pub regime: Regime,
    /// Distinct tickers in submission order.
    pub tickers: Vec<Ticker>,
    /// Evaluation per ticker; `null` for entities abandoned at the deadline.
    pub evaluations: BTreeMap<Ticker, Option<Evaluation>>,
    /// Metric set per ticker (possibly empty).
    pub metrics: BTreeMap<Ticker, MetricSet>,
}

impl ScreeningReport {
    /// Evaluation for a ticker, if any.
    #[must_use]
    pub fn evaluation(&self, ticker: &Ticker) -> Option<&Evaluation> {
        self.evaluations.get(ticker).and_then(Option::as_ref)
    }

    /// Metrics for a ticker; empty if unknown.
    #[must_use]
    pub fn metrics_for(&self, ticker: &Ticker) -> Option<&MetricSet> {
        self.metrics.get(ticker)
    }

    /// Tickers ranked by score, best first. Missing evaluations sort last.
    #[must_use]
    pub fn ranked(&self) -> Vec<(&Ticker, Option<u8>)> {
        let mut ranked: Vec<_> = self
            .tickers
            .iter()
            .map(|t| (t, self.evaluation(t).map(Evaluation::score)))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
    }
}

/// Result of a single-entity run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TickerOutcome {
    /// The entity had metrics and was evaluated.
    Evaluated(Evaluation),
    /// The entity had no metrics; plain message.
    NoData(String),
}

impl TickerOutcome {
    /// Message used when a ticker has no metrics.
    #[must_use]
    pub fn no_data(ticker: &Ticker) -> Self {
        Self::NoData(format!(
            "No financial metrics available for evaluation (Ticker: {ticker})."
        ))
    }
}
