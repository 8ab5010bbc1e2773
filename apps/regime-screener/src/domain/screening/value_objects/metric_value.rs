//! Scalar metric value that survives serialization with its sentinels.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A computed metric.
///
/// Finite values serialize as JSON numbers. NaN and the infinities serialize
/// as the strings `"NaN"`, `"Infinity"` and `"-Infinity"` so a report can be
/// written and read back without losing sentinels.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricValue(f64);

impl MetricValue {
    /// Undefined metric (missing data or zero denominator on a plain ratio).
    pub const NAN: Self = Self(f64::NAN);

    /// Wrap a raw value.
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// The raw value.
    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }

    /// True for ordinary numbers.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }
}

impl PartialEq for MetricValue {
    /// NaN compares equal to NaN so that reports can be compared after a round trip.
    fn eq(&self, other: &Self) -> bool {
        (self.0.is_nan() && other.0.is_nan()) || self.0 == other.0
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_nan() {
            f.write_str("NaN")
        } else if self.0.is_infinite() {
            f.write_str(if self.0 > 0.0 { "Infinity" } else { "-Infinity" })
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl Serialize for MetricValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.is_finite() {
            serializer.serialize_f64(self.0)
        } else {
            serializer.collect_str(self)
        }
    }
}

struct MetricValueVisitor;

impl Visitor<'_> for MetricValueVisitor {
    type Value = MetricValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number or one of \"NaN\", \"Infinity\", \"-Infinity\"")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(MetricValue(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(MetricValue(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(MetricValue(v as f64))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(MetricValue::NAN)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        match v {
            "NaN" | "nan" => Ok(MetricValue::NAN),
            "Infinity" | "inf" => Ok(MetricValue(f64::INFINITY)),
            "-Infinity" | "-inf" => Ok(MetricValue(f64::NEG_INFINITY)),
            other => other
                .parse::<f64>()
                .map(MetricValue)
                .map_err(|_| E::invalid_value(de::Unexpected::Str(other), &self)),
        }
    }
}

impl<'de> Deserialize<'de> for MetricValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MetricValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finite_values_are_numbers() {
        let json = serde_json::to_string(&MetricValue::new(0.25)).unwrap();
        assert_eq!(json, "0.25");
    }

    #[test]
    fn sentinels_are_strings() {
        assert_eq!(serde_json::to_string(&MetricValue::NAN).unwrap(), "\"NaN\"");
        assert_eq!(
            serde_json::to_string(&MetricValue::new(f64::INFINITY)).unwrap(),
            "\"Infinity\""
        );
        assert_eq!(
            serde_json::to_string(&MetricValue::new(f64::NEG_INFINITY)).unwrap(),
            "\"-Infinity\""
        );
    }

    #[test]
    fn sentinels_survive_round_trip() {
        for raw in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, -3.5, 0.0] {
            let value = MetricValue::new(raw);
            let json = serde_json::to_string(&value).unwrap();
            let back: MetricValue = serde_json::from_str(&json).unwrap();
            assert_eq!(back, value, "round trip of {raw}");
        }
    }

    #[test]
    fn null_and_integers_deserialize() {
        let nan: MetricValue = serde_json::from_str("null").unwrap();
        assert!(nan.get().is_nan());
        let int: MetricValue = serde_json::from_str("7").unwrap();
        assert_eq!(int.get(), 7.0);
    }

    #[test]
    fn garbage_string_is_rejected() {
        assert!(serde_json::from_str::<MetricValue>("\"lots\"").is_err());
    }
}
