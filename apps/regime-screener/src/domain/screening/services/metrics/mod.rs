//! Regime metric calculators.
//!
//! Pure functions from raw statements to headline metrics. They never fail:
//! missing line items become NaN series and undefined ratios become NaN or
//! +∞ (see [`common`]).

pub mod common;
mod financial;
mod non_financial;

use crate::domain::screening::value_objects::{SupplementalGroup, SupplementalValue};

pub use financial::{
    efficiency_ratio, efficiency_ratio_delta, equity_to_assets, financial_metrics, nii_growth_yoy, ppnr,
    ppnr_growth_volatility_qtr, ppnr_to_assets, roe_roa,
};
pub use non_financial::{
    cash_to_debt, dso_change_yoy, ebitda_margin, ebitda_margin_volatility, expansion_metrics,
    gross_margin_trend_bps, inflation_metrics, interest_coverage, inventory_turnover,
    net_debt_to_ebitda, recession_metrics, revenue_growth, stagflation_metrics,
};

/// Statement line item names as reported by the data provider.
pub mod line_items {
    /// Total revenue.
    pub const TOTAL_REVENUE: &str = "TotalRevenue";
    /// Cost of revenue (COGS).
    pub const COST_OF_REVENUE: &str = "CostOfRevenue";
    /// EBITDA.
    pub const EBITDA: &str = "EBITDA";
    /// EBIT.
    pub const EBIT: &str = "EBIT";
    /// Interest expense.
    pub const INTEREST_EXPENSE: &str = "InterestExpense";
    /// Net debt.
    pub const NET_DEBT: &str = "NetDebt";
    /// Total debt.
    pub const TOTAL_DEBT: &str = "TotalDebt";
    /// Inventory.
    pub const INVENTORY: &str = "Inventory";
    /// Cash and cash equivalents.
    pub const CASH: &str = "CashAndCashEquivalents";
    /// Short-term investments.
    pub const SHORT_TERM_INVESTMENTS: &str = "ShortTermInvestments";
    /// Accounts receivable.
    pub const ACCOUNTS_RECEIVABLE: &str = "AccountsReceivable";
    /// Net interest income.
    pub const NET_INTEREST_INCOME: &str = "NetInterestIncome";
    /// Selling, general and administrative expense.
    pub const SGA: &str = "SellingGeneralAndAdministration";
    /// Other non-interest expense.
    pub const OTHER_NON_INTEREST_EXPENSE: &str = "OtherNonInterestExpense";
    /// Net income.
    pub const NET_INCOME: &str = "NetIncome";
    /// Total equity including minority interest.
    pub const TOTAL_EQUITY: &str = "TotalEquityGrossMinorityInterest";
    /// Total assets.
    pub const TOTAL_ASSETS: &str = "TotalAssets";
}

/// A headline value plus the intermediates that produced it.
#[derive(Debug, Clone, Default)]
pub struct MetricBreakdown {
    /// The headline value.
    pub value: f64,
    /// Intermediate series and scalars, keyed by description.
    pub details: SupplementalGroup,
}

impl MetricBreakdown {
    fn new(value: f64) -> Self {
        Self {
            value,
            details: SupplementalGroup::new(),
        }
    }

    fn detail(mut self, key: &str, value: impl Into<SupplementalValue>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }
}
