//! Headline metrics plus supplemental detail for one entity.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::financials::Series;
use super::metric_value::MetricValue;

/// One supplemental detail: either a scalar or a dated series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SupplementalValue {
    /// A single intermediate value.
    Scalar(MetricValue),
    /// An intermediate series keyed by "YYYY-MM-DD".
    Series(BTreeMap<String, MetricValue>),
}

impl From<f64> for SupplementalValue {
    fn from(value: f64) -> Self {
        Self::Scalar(MetricValue::new(value))
    }
}

impl From<&Series> for SupplementalValue {
    fn from(series: &Series) -> Self {
        Self::Series(
            series
                .points()
                .iter()
                .map(|(d, v)| (format_period(*d), MetricValue::new(*v)))
                .collect(),
        )
    }
}

fn format_period(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Named supplemental values backing one headline metric.
pub type SupplementalGroup = BTreeMap<String, SupplementalValue>;

/// The metrics produced for one entity by its metric stage.
///
/// Serializes as a flat map of headline labels to values, plus a nested
/// `"supplemental info"` map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSet {
    #[serde(flatten)]
    headline: BTreeMap<String, MetricValue>,
    #[serde(
        rename = "supplemental info",
        default,
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    supplemental: BTreeMap<String, SupplementalGroup>,
}

impl MetricSet {
    /// An empty set: the entity could not be measured.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add a headline metric.
    #[must_use]
    pub fn with_metric(mut self, label: impl Into<String>, value: f64) -> Self {
        self.headline.insert(label.into(), MetricValue::new(value));
        self
    }

    /// Add a supplemental group.
    #[must_use]
    pub fn with_supplemental(mut self, group: impl Into<String>, details: SupplementalGroup) -> Self {
        self.supplemental.insert(group.into(), details);
        self
    }

    /// True when no headline metric was produced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.headline.is_empty()
    }

    /// Number of headline metrics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.headline.len()
    }

    /// Look up a headline metric.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<MetricValue> {
        self.headline.get(label).copied()
    }

    /// Headline metrics in label order.
    pub fn headline(&self) -> impl Iterator<Item = (&str, MetricValue)> {
        self.headline.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Supplemental groups.
    #[must_use]
    pub const fn supplemental(&self) -> &BTreeMap<String, SupplementalGroup> {
        &self.supplemental
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MetricSet {
        let mut details = SupplementalGroup::new();
        details.insert("Quarter Revenue Growth".to_string(), SupplementalValue::from(0.04));
        details.insert(
            "Annual Revenue".to_string(),
            SupplementalValue::from(&Series::from_points([(
                NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
                100.0,
            )])),
        );
        MetricSet::empty()
            .with_metric("Revenue Growth (YoY)", 0.12)
            .with_metric("Net Debt / EBITDA", f64::NAN)
            .with_supplemental("Revenue Growth", details)
    }

    #[test]
    fn serializes_flat_with_supplemental_info() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["Revenue Growth (YoY)"], serde_json::json!(0.12));
        assert_eq!(value["Net Debt / EBITDA"], serde_json::json!("NaN"));
        assert_eq!(
            value["supplemental info"]["Revenue Growth"]["Annual Revenue"]["2024-12-31"],
            serde_json::json!(100.0)
        );
    }

    #[test]
    fn round_trips_with_sentinels() {
        let set = sample();
        let json = serde_json::to_string(&set).unwrap();
        let back: MetricSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
        assert_eq!(back.len(), 2);
    }

    #[test]
    fn empty_set_serializes_as_empty_object() {
        let json = serde_json::to_string(&MetricSet::empty()).unwrap();
        assert_eq!(json, "{}");
        assert!(MetricSet::empty().is_empty());
    }
}
