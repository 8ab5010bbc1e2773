//! On-disk financials document.

use serde::{Deserialize, Serialize};

use crate::application::ports::FetchedFinancials;
use crate::domain::screening::{Financials, Sector, Statement};
use crate::domain::shared::DomainError;

/// `{sector, annual_income, quarterly_income, annual_balance_sheet,
/// quarterly_balance_sheet}`; each statement maps line item to date to value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialsDocument {
    /// Reported sector.
    pub sector: String,
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

impl FinancialsDocument {
    /// Convert into the port type.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidValue` for a blank sector.
    pub fn into_fetched(self) -> Result<FetchedFinancials, DomainError> {
        Ok(FetchedFinancials {
            sector: Sector::new(self.sector)?,
            financials: Financials {
                annual_income: self.annual_income,
                quarterly_income: self.quarterly_income,
                annual_balance_sheet: self.annual_balance_sheet,
                quarterly_balance_sheet: self.quarterly_balance_sheet,
            },
        })
    }
}

impl From<&FetchedFinancials> for FinancialsDocument {
    fn from(fetched: &FetchedFinancials) -> Self {
        let f = &fetched.financials;
        Self {
            sector: fetched.sector.to_string(),
            annual_income: f.annual_income.clone(),
            quarterly_income: f.quarterly_income.clone(),
            annual_balance_sheet: f.annual_balance_sheet.clone(),
            quarterly_balance_sheet: f.quarterly_balance_sheet.clone(),
        }
    }
}
