//! Financial Data Port (Driven Port)
//!
//! Interface for fetching a ticker's sector and raw statements.

use async_trait::async_trait;

use crate::domain::screening::{Financials, Sector};
use crate::domain::shared::Ticker;

/// Sector plus the four statements for one ticker.
#[derive(Debug, Clone)]
pub struct FetchedFinancials {
    /// Reported sector.
    pub sector: Sector,
    /// Annual/quarterly income statements and balance sheets.
    pub financials: Financials,
}

/// Data provider error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DataProviderError {
    /// The provider does not know the ticker.
    #[error("Unknown ticker: {ticker}")]
    UnknownTicker {
        /// The unknown ticker.
        ticker: String,
    },

    /// The provider knows the ticker but returned no usable data.
    #[error("Financial data unavailable for {ticker}: {message}")]
    DataUnavailable {
        /// Ticker.
        ticker: String,
        /// Error details.
        message: String,
    },

    /// The provider returned data that could not be parsed.
    #[error("Malformed financial data for {ticker}: {message}")]
    Malformed {
        /// Ticker.
        ticker: String,
        /// Error details.
        message: String,
    },

    /// Transport failure.
    #[error("Data provider connection error: {message}")]
    ConnectionError {
        /// Error details.
        message: String,
    },
}

/// Port for fetching financial statements.
///
/// This is a driven (secondary/outbound) port. The infrastructure layer
/// provides implementations (fixture directory, in-memory).
#[async_trait]
pub trait FinancialDataPort: Send + Sync {
    /// Fetch sector and statements for a ticker.
    ///
    /// Missing line items are not an error; they degrade to NaN downstream.
    async fn fetch(&self, ticker: &Ticker) -> Result<FetchedFinancials, DataProviderError>;
}
