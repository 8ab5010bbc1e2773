//! Ticker value object identifying one screened entity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::shared::DomainError;

/// An equity ticker such as "AAPL" or "JPM".
///
/// Tickers are trimmed and normalized to uppercase so that `aapl` and
/// `AAPL ` address the same entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticker(String);

impl Ticker {
    /// Create a new Ticker.
    ///
    /// The ticker is trimmed and normalized to uppercase.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_uppercase())
    }

    /// Get the ticker string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Ticker {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ticker = Self::new(s);
        if ticker.0.is_empty() {
            return Err(DomainError::InvalidValue {
                field: "ticker".to_string(),
                message: "ticker cannot be empty".to_string(),
            });
        }
        if ticker.0.chars().any(char::is_whitespace) {
            return Err(DomainError::InvalidValue {
                field: "ticker".to_string(),
                message: format!("ticker '{}' contains whitespace", ticker.0),
            });
        }
        Ok(ticker)
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Ticker {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticker_normalizes_case_and_whitespace() {
        assert_eq!(Ticker::new(" aapl ").as_str(), "AAPL");
        assert_eq!(Ticker::from("jpm"), Ticker::new("JPM"));
    }

    #[test]
    fn ticker_parse_rejects_empty() {
        let Err(err) = "   ".parse::<Ticker>() else {
            panic!("expected empty ticker to be rejected");
        };
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn ticker_parse_rejects_inner_whitespace() {
        assert!("BRK B".parse::<Ticker>().is_err());
        assert_eq!("brk-b".parse::<Ticker>().unwrap().as_str(), "BRK-B");
    }

    #[test]
    fn ticker_orders_lexicographically() {
        let mut tickers = vec![Ticker::new("MSFT"), Ticker::new("AAPL")];
        tickers.sort();
        assert_eq!(tickers[0].as_str(), "AAPL");
    }
}
