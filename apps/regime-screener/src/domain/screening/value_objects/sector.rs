//! Sector classification reported by the data provider.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::shared::DomainError;

/// Sector name that selects the bank-specific metric path.
pub const FINANCIAL_SERVICES: &str = "Financial Services";

/// Sector string as reported by the data provider (never empty).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Sector(String);

impl Sector {
    /// Create a sector, rejecting blank names.
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into().trim().to_string();
        if value.is_empty() {
            return Err(DomainError::InvalidValue {
                field: "sector".to_string(),
                message: "sector cannot be empty".to_string(),
            });
        }
        Ok(Self(value))
    }

    /// Get the sector name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Coarse classification used for routing and table selection.
    #[must_use]
    pub fn class(&self) -> SectorClass {
        if self.0 == FINANCIAL_SERVICES {
            SectorClass::Financial
        } else {
            SectorClass::NonFinancial
        }
    }
}

impl TryFrom<String> for Sector {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Sector> for String {
    fn from(value: Sector) -> Self {
        value.0
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Financial (bank) versus everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectorClass {
    /// "Financial Services".
    Financial,
    /// Any other sector.
    NonFinancial,
}

impl SectorClass {
    /// Classify an optional sector; an unknown sector is non-financial.
    #[must_use]
    pub fn of(sector: Option<&Sector>) -> Self {
        sector.map_or(Self::NonFinancial, Sector::class)
    }
}

impl fmt::Display for SectorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Financial => write!(f, "financial"),
            Self::NonFinancial => write!(f, "non-financial"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn financial_services_is_financial() {
        let sector = Sector::new("Financial Services").unwrap();
        assert_eq!(sector.class(), SectorClass::Financial);
    }

    #[test]
    fn other_sectors_are_non_financial() {
        for name in ["Technology", "Healthcare", "Financial", "financial services"] {
            assert_eq!(Sector::new(name).unwrap().class(), SectorClass::NonFinancial);
        }
    }

    #[test]
    fn blank_sector_is_rejected() {
        assert!(Sector::new("  ").is_err());
        assert!(serde_json::from_str::<Sector>("\"\"").is_err());
    }

    #[test]
    fn missing_sector_classifies_as_non_financial() {
        assert_eq!(SectorClass::of(None), SectorClass::NonFinancial);
    }
}
