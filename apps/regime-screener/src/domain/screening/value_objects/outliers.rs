//! Interquartile outlier bounds used to flag suspicious metrics.
//!
//! Bounds are stored in each metric's own units (fractions for percentages,
//! basis points, multiples or days) so they can be compared with computed
//! values directly. Lower bounds are floored at zero where a negative value
//! is meaningless.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use super::labels;
use super::metric_set::MetricSet;
use super::sector::SectorClass;

/// Unit a metric is expressed in, for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricUnit {
    /// Fraction rendered as a percentage.
    Percent,
    /// Multiple rendered with an `x` suffix.
    Multiple,
    /// Basis points.
    Bps,
    /// Days.
    Days,
}

impl MetricUnit {
    fn render(self, value: f64) -> String {
        match self {
            Self::Percent => format!("{:.2}%", value * 100.0),
            Self::Multiple => format!("{value:.2}x"),
            Self::Bps => format!("{value:.0} bps"),
            Self::Days => format!("{value:.0}d"),
        }
    }
}

/// Q1/Q3 and extreme bounds for one metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierBound {
    /// Headline metric label this bound applies to.
    pub metric: &'static str,
    /// First quartile.
    pub q1: f64,
    /// Third quartile.
    pub q3: f64,
    /// Extreme lower bound (Q1 − 1.5×IQR, floored where noted).
    pub lower: f64,
    /// Extreme upper bound (Q3 + 1.5×IQR).
    pub upper: f64,
    /// Rendering unit.
    pub unit: MetricUnit,
    /// What an extreme value usually means.
    pub notes: &'static str,
}

impl OutlierBound {
    /// Interquartile range.
    #[must_use]
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// Classify a value against the extreme bounds.
    #[must_use]
    pub fn classify(&self, value: f64) -> Option<OutlierKind> {
        if !value.is_finite() {
            Some(OutlierKind::NonFinite)
        } else if value < self.lower {
            Some(OutlierKind::BelowLower)
        } else if value > self.upper {
            Some(OutlierKind::AboveUpper)
        } else {
            None
        }
    }
}

const fn bound(
    metric: &'static str,
    q1: f64,
    q3: f64,
    lower: f64,
    upper: f64,
    unit: MetricUnit,
    notes: &'static str,
) -> OutlierBound {
    OutlierBound {
        metric,
        q1,
        q3,
        lower,
        upper,
        unit,
        notes,
    }
}

const NON_FINANCIAL: [OutlierBound; 9] = [
    bound(labels::REVENUE_GROWTH, -0.05, 0.25, -0.50, 0.70, MetricUnit::Percent, "Very large negative or very high growth warrants checking seasonality, M&A, one-offs."),
    bound(labels::EBITDA_MARGIN, 0.10, 0.30, -0.20, 0.60, MetricUnit::Percent, "Implausibly high margins or deep losses need verification of classification/adjustments."),
    bound(labels::NET_DEBT_TO_EBITDA, 1.0, 4.0, -3.5, 8.5, MetricUnit::Multiple, "High leverage or large net cash (negative) should be validated for definitions and normalization."),
    bound(labels::GROSS_MARGIN_TREND, -100.0, 100.0, -400.0, 400.0, MetricUnit::Bps, "Large swings could reflect mix, pricing, or recognition timing anomalies."),
    bound(labels::INVENTORY_TURNOVER, 3.0, 8.0, 0.0, 15.5, MetricUnit::Multiple, "Extremely low implies stale inventory; extremely high could mask stockouts or accounting quirks."),
    bound(labels::INTEREST_COVERAGE, 3.0, 15.0, 0.0, 33.0, MetricUnit::Multiple, "Very low coverage is a risk; very high may hide near-zero interest expense."),
    bound(labels::EBITDA_MARGIN_VOLATILITY, 0.01, 0.05, 0.0, 0.11, MetricUnit::Percent, "Excessive volatility suggests instability; near-zero might prompt a sanity check."),
    bound(labels::CASH_TO_DEBT, 0.2, 1.0, 0.0, 2.2, MetricUnit::Multiple, "Very low ratio signals liquidity stress; very high may reflect a conservative balance sheet or classification issues."),
    bound(labels::DSO_CHANGE, -5.0, 5.0, -20.0, 20.0, MetricUnit::Days, "Large positive = slowing collections; large negative = aggressive behavior or write-offs."),
];

const FINANCIAL: [OutlierBound; 8] = [
    bound(labels::PPNR_GROWTH, -0.02, 0.15, -0.27, 0.40, MetricUnit::Percent, "Very weak or very high growth may reflect credit cycle extremes, NII shocks, or unusual expenses."),
    bound(labels::EFFICIENCY_RATIO, 0.50, 0.70, 0.20, 1.00, MetricUnit::Percent, "<20% may be misclassified revenues; >100% signals unsustainable costs."),
    bound(labels::ROE, 0.05, 0.15, 0.0, 0.30, MetricUnit::Percent, "Very low ROE suggests weak profitability; very high may reflect leverage or one-offs."),
    bound(labels::ROA, 0.004, 0.012, 0.0, 0.024, MetricUnit::Percent, "Extreme values warrant review of asset base or income recognition."),
    bound(labels::EQUITY_TO_ASSETS, 0.06, 0.12, 0.0, 0.21, MetricUnit::Percent, "Very low = undercapitalization; very high may indicate niche/mix-driven business models."),
    bound(labels::PPNR_GROWTH_VOLATILITY, 0.02, 0.06, 0.0, 0.12, MetricUnit::Percent, "Quarterly growth volatility is more informative than annual with sparse data."),
    bound(labels::PPNR_TO_ASSETS, 0.006, 0.015, 0.0, 0.0285, MetricUnit::Percent, "Extreme low = weak core earnings; extreme high may reflect temporary windfalls or abnormal quarters."),
    bound(labels::NII_GROWTH, -0.03, 0.12, -0.25, 0.34, MetricUnit::Percent, "Very high/low growth may reflect rate shocks, asset/liability mismatches, or trading income noise."),
];

/// Outlier table for a sector class: the bank table for financials,
/// the operating-company table otherwise.
#[must_use]
pub const fn outlier_table(class: SectorClass) -> &'static [OutlierBound] {
    match class {
        SectorClass::Financial => &FINANCIAL,
        SectorClass::NonFinancial => &NON_FINANCIAL,
    }
}

/// Render an outlier table as markdown.
#[must_use]
pub fn render_outlier_table(table: &[OutlierBound]) -> String {
    let mut out = String::from(
        "| Metric | Q1 | Q3 | IQR | Extreme Lower Bound | Extreme Upper Bound | Notes |\n|---|---|---|---|---|---|---|",
    );
    for b in table {
        let _ = write!(
            out,
            "\n| {} | {} | {} | {} | {} | {} | {} |",
            b.metric,
            b.unit.render(b.q1),
            b.unit.render(b.q3),
            b.unit.render(b.iqr()),
            b.unit.render(b.lower),
            b.unit.render(b.upper),
            b.notes
        );
    }
    out
}

/// Why a metric was flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlierKind {
    /// Below the extreme lower bound.
    BelowLower,
    /// Above the extreme upper bound.
    AboveUpper,
    /// NaN or infinite.
    NonFinite,
}

/// A headline metric outside its extreme bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlierFlag {
    /// Metric label.
    pub metric: String,
    /// Computed value.
    pub value: f64,
    /// Classification.
    pub kind: OutlierKind,
}

/// Flag every headline metric that has a bound in `table` and falls outside it.
#[must_use]
pub fn flag_outliers(metrics: &MetricSet, table: &[OutlierBound]) -> Vec<OutlierFlag> {
    metrics
        .headline()
        .filter_map(|(label, value)| {
            let bound = table.iter().find(|b| b.metric == label)?;
            bound.classify(value.get()).map(|kind| OutlierFlag {
                metric: label.to_string(),
                value: value.get(),
                kind,
            })
        })
        .collect()
}
