//! Raw financial statements as period-indexed line-item series.
//!
//! Every series is stored most-recent-first. Metric code that needs
//! chronological order goes through [`Series::chronological`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Write as _};

use crate::domain::shared::DomainError;

/// A period-indexed value series, most recent period first.
///
/// Missing observations are stored as NaN.
#[derive(Debug, Clone, Default)]
pub struct Series {
    points: Vec<(NaiveDate, f64)>,
}

impl Series {
    /// Build a series from unordered points. Later duplicates of a period are dropped.
    #[must_use]
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        let mut points: Vec<(NaiveDate, f64)> = points.into_iter().collect();
        points.sort_by(|a, b| b.0.cmp(&a.0));
        points.dedup_by_key(|p| p.0);
        Self { points }
    }

    /// A NaN series aligned to the given periods.
    #[must_use]
    pub fn nan(periods: &[NaiveDate]) -> Self {
        Self::from_points(periods.iter().map(|d| (*d, f64::NAN)))
    }

    /// Number of periods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the series has no periods.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Value at `index` counting back from the latest period; NaN when out of range.
    #[must_use]
    pub fn get(&self, index: usize) -> f64 {
        self.points.get(index).map_or(f64::NAN, |p| p.1)
    }

    /// Latest value; NaN for an empty series.
    #[must_use]
    pub fn latest(&self) -> f64 {
        self.get(0)
    }

    /// Points, most recent first.
    #[must_use]
    pub fn points(&self) -> &[(NaiveDate, f64)] {
        &self.points
    }

    /// Copy with NaN observations removed.
    #[must_use]
    pub fn observed(&self) -> Self {
        Self {
            points: self
                .points
                .iter()
                .copied()
                .filter(|p| !p.1.is_nan())
                .collect(),
        }
    }

    /// Points oldest first.
    #[must_use]
    pub fn chronological(&self) -> Vec<(NaiveDate, f64)> {
        self.points.iter().rev().copied().collect()
    }

    /// Combine two series period by period over the union of their periods.
    ///
    /// A period present on only one side sees NaN for the other.
    #[must_use]
    pub fn combine(&self, other: &Self, f: impl Fn(f64, f64) -> f64) -> Self {
        let mut merged: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();
        for (date, value) in &self.points {
            merged.entry(*date).or_insert((f64::NAN, f64::NAN)).0 = *value;
        }
        for (date, value) in &other.points {
            merged.entry(*date).or_insert((f64::NAN, f64::NAN)).1 = *value;
        }
        Self::from_points(merged.into_iter().map(|(d, (a, b))| (d, f(a, b))))
    }
}

/// Wire form of a statement: `{line_item: {"YYYY-MM-DD": value | null}}`.
pub type RawStatement = BTreeMap<String, BTreeMap<String, Option<f64>>>;

/// One financial statement: named line items over a shared set of periods.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "RawStatement", into = "RawStatement")]
pub struct Statement {
    periods: Vec<NaiveDate>,
    lines: BTreeMap<String, Series>,
}

impl Statement {
    /// Build a statement from named series.
    #[must_use]
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = (S, Series)>,
        S: Into<String>,
    {
        let lines: BTreeMap<String, Series> =
            lines.into_iter().map(|(k, v)| (k.into(), v)).collect();
        let mut periods: Vec<NaiveDate> = lines
            .values()
            .flat_map(|s| s.points().iter().map(|p| p.0))
            .collect();
        periods.sort_unstable_by(|a, b| b.cmp(a));
        periods.dedup();
        Self { periods, lines }
    }

    /// Series for a line item, or a NaN series over this statement's periods
    /// when the line item is absent.
    #[must_use]
    pub fn line(&self, name: &str) -> Series {
        self.lines
            .get(name)
            .cloned()
            .unwrap_or_else(|| Series::nan(&self.periods))
    }

    /// True when the line item exists.
    #[must_use]
    pub fn has_line(&self, name: &str) -> bool {
        self.lines.contains_key(name)
    }

    /// All periods, most recent first.
    #[must_use]
    pub fn periods(&self) -> &[NaiveDate] {
        &self.periods
    }

    /// True when the statement has no line items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Render as a markdown table, one row per line item.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::from("| Line item |");
        for period in &self.periods {
            let _ = write!(out, " {period} |");
        }
        out.push_str("\n|---|");
        for _ in &self.periods {
            out.push_str("---|");
        }
        for (name, series) in &self.lines {
            let _ = write!(out, "\n| {name} |");
            for period in &self.periods {
                let value = series
                    .points()
                    .iter()
                    .find(|p| p.0 == *period)
                    .map_or(f64::NAN, |p| p.1);
                if value.is_nan() {
                    out.push_str(" - |");
                } else {
                    let _ = write!(out, " {value} |");
                }
            }
        }
        out
    }
}

fn parse_period(raw: &str) -> Result<NaiveDate, DomainError> {
    let trimmed = raw.trim();
    let date_part = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|e| DomainError::InvalidValue {
        field: "period".to_string(),
        message: format!("'{raw}': {e}"),
    })
}

impl TryFrom<RawStatement> for Statement {
    type Error = DomainError;

    fn try_from(raw: RawStatement) -> Result<Self, Self::Error> {
        let mut lines = Vec::with_capacity(raw.len());
        for (name, values) in raw {
            let points = values
                .into_iter()
                .map(|(period, value)| Ok((parse_period(&period)?, value.unwrap_or(f64::NAN))))
                .collect::<Result<Vec<_>, DomainError>>()?;
            lines.push((name, Series::from_points(points)));
        }
        Ok(Self::new(lines))
    }
}

impl From<Statement> for RawStatement {
    fn from(statement: Statement) -> Self {
        statement
            .lines
            .into_iter()
            .map(|(name, series)| {
                let values = series
                    .points
                    .iter()
                    .map(|(d, v)| (d.format("%Y-%m-%d").to_string(), v.is_finite().then_some(*v)))
                    .collect();
                (name, values)
            })
            .collect()
    }
}

/// Which of the four statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    /// Annual income statement.
    AnnualIncome,
    /// Quarterly income statement.
    QuarterlyIncome,
    /// Annual balance sheet.
    AnnualBalanceSheet,
    /// Quarterly balance sheet.
    QuarterlyBalanceSheet,
}

impl StatementKind {
    /// All statements in accessor order.
    pub const ALL: [Self; 4] = [
        Self::AnnualIncome,
        Self::QuarterlyIncome,
        Self::AnnualBalanceSheet,
        Self::QuarterlyBalanceSheet,
    ];

    /// Human-readable name.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::AnnualIncome => "annual income statement",
            Self::QuarterlyIncome => "quarterly income statement",
            Self::AnnualBalanceSheet => "annual balance sheet",
            Self::QuarterlyBalanceSheet => "quarterly balance sheet",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// The four raw statements fetched for one ticker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Financials {
    /// Annual income statement.
    #[serde(default)]
    pub annual_income: Statement,
    /// Quarterly income statement.
    #[serde(default)]
    pub quarterly_income: Statement,
    /// Annual balance sheet.
    #[serde(default)]
    pub annual_balance_sheet: Statement,
    /// Quarterly balance sheet.
    #[serde(default)]
    pub quarterly_balance_sheet: Statement,
}

impl Financials {
    /// Borrow one statement by kind.
    #[must_use]
    pub const fn statement(&self, kind: StatementKind) -> &Statement {
        match kind {
            StatementKind::AnnualIncome => &self.annual_income,
            StatementKind::QuarterlyIncome => &self.quarterly_income,
            StatementKind::AnnualBalanceSheet => &self.annual_balance_sheet,
            StatementKind::QuarterlyBalanceSheet => &self.quarterly_balance_sheet,
        }
    }

    /// True when every statement is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        StatementKind::ALL
            .iter()
            .all(|kind| self.statement(*kind).is_empty())
    }
}
