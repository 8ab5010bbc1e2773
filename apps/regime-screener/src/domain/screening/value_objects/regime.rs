//! Macro-economic regime selected for a screening run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::shared::DomainError;

/// The four macro-economic regimes a portfolio can be screened against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Regime {
    /// Growth with contained inflation.
    Expansion,
    /// Rising prices and rates.
    Inflation,
    /// Weak growth with rising prices.
    Stagflation,
    /// Contracting output and demand.
    Recession,
}

impl Regime {
    /// All regimes in selection order (index 0..=3).
    pub const ALL: [Self; 4] = [
        Self::Expansion,
        Self::Inflation,
        Self::Stagflation,
        Self::Recession,
    ];

    /// Canonical name used in reports and prompts.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Expansion => "Expansion",
            Self::Inflation => "Inflation",
            Self::Stagflation => "Stagflation",
            Self::Recession => "Recession",
        }
    }

    /// Selection index used by the command line (0=Expansion .. 3=Recession).
    #[must_use]
    pub const fn index(&self) -> usize {
        match self {
            Self::Expansion => 0,
            Self::Inflation => 1,
            Self::Stagflation => 2,
            Self::Recession => 3,
        }
    }
}

impl FromStr for Regime {
    type Err = DomainError;

    /// Accepts a selection index, a canonical name or its adjective form
    /// ("Expansionary", "Inflationary", "Stagflationary"), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(index) = trimmed.parse::<usize>() {
            return Self::ALL
                .get(index)
                .copied()
                .ok_or_else(|| DomainError::InvalidValue {
                    field: "regime".to_string(),
                    message: format!("regime index {index} out of range 0..=3"),
                });
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "expansion" | "expansionary" => Ok(Self::Expansion),
            "inflation" | "inflationary" => Ok(Self::Inflation),
            "stagflation" | "stagflationary" => Ok(Self::Stagflation),
            "recession" | "recessionary" => Ok(Self::Recession),
            _ => Err(DomainError::InvalidValue {
                field: "regime".to_string(),
                message: format!("unknown regime '{trimmed}'"),
            }),
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("0", Regime::Expansion)]
    #[test_case("1", Regime::Inflation)]
    #[test_case("2", Regime::Stagflation)]
    #[test_case("3", Regime::Recession)]
    #[test_case("expansion", Regime::Expansion)]
    #[test_case("Inflationary", Regime::Inflation)]
    #[test_case(" STAGFLATION ", Regime::Stagflation)]
    #[test_case("Recession", Regime::Recession)]
    fn parses_regime(input: &str, expected: Regime) {
        assert_eq!(input.parse::<Regime>().unwrap(), expected);
    }

    #[test_case("4")]
    #[test_case("Boom")]
    #[test_case("")]
    fn rejects_unknown_regime(input: &str) {
        let Err(err) = input.parse::<Regime>() else {
            panic!("expected '{input}' to be rejected");
        };
        assert!(err.to_string().contains("regime"));
    }

    #[test]
    fn index_round_trips_through_all() {
        for regime in Regime::ALL {
            assert_eq!(Regime::ALL[regime.index()], regime);
        }
    }

    #[test]
    fn serializes_as_canonical_name() {
        let json = serde_json::to_string(&Regime::Stagflation).unwrap();
        assert_eq!(json, "\"Stagflation\"");
    }
}
