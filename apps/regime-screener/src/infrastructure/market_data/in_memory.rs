//! In-memory financial data for tests and demos.

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::application::ports::{DataProviderError, FetchedFinancials, FinancialDataPort};
use crate::domain::screening::services::metrics::line_items as li;
use crate::domain::screening::{FINANCIAL_SERVICES, Financials, Sector, Series, Statement};
use crate::domain::shared::Ticker;

/// Seeded map from ticker to financials. Unknown tickers fail the fetch.
#[derive(Debug, Default)]
pub struct InMemoryDataProvider {
    entries: RwLock<HashMap<Ticker, FetchedFinancials>>,
}

impl InMemoryDataProvider {
    /// Empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider seeded with `ACME` (industrials) and `BANKCO` (a bank).
    #[must_use]
    pub fn with_samples() -> Self {
        let provider = Self::new();
        provider.insert(Ticker::new("ACME"), samples::industrial());
        provider.insert(Ticker::new("BANKCO"), samples::bank());
        provider
    }

    /// Add or replace a ticker.
    pub fn insert(&self, ticker: Ticker, financials: FetchedFinancials) {
        self.entries.write().insert(ticker, financials);
    }

    /// Number of seeded tickers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// True when nothing is seeded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl FinancialDataPort for InMemoryDataProvider {
    async fn fetch(&self, ticker: &Ticker) -> Result<FetchedFinancials, DataProviderError> {
        self.entries
            .read()
            .get(ticker)
            .cloned()
            .ok_or_else(|| DataProviderError::UnknownTicker {
                ticker: ticker.to_string(),
            })
    }
}

/// Sample companies.
pub mod samples {
    use super::{
        FINANCIAL_SERVICES, FetchedFinancials, Financials, NaiveDate, Sector, Series, Statement,
        li,
    };

    const YEARS: [(i32, u32, u32); 4] = [(2024, 12, 31), (2023, 12, 31), (2022, 12, 31), (2021, 12, 31)];
    const QUARTERS: [(i32, u32, u32); 5] = [
        (2024, 12, 31),
        (2024, 9, 30),
        (2024, 6, 30),
        (2024, 3, 31),
        (2023, 12, 31),
    ];

    fn periods(dates: &[(i32, u32, u32)]) -> Vec<NaiveDate> {
        dates
            .iter()
            .filter_map(|(y, m, d)| NaiveDate::from_ymd_opt(*y, *m, *d))
            .collect()
    }

    /// Statement from most-recent-first values aligned to `dates`.
    pub fn statement(dates: &[(i32, u32, u32)], lines: &[(&str, &[f64])]) -> Statement {
        let periods = periods(dates);
        Statement::new(lines.iter().map(|(name, values)| {
            (
                (*name).to_string(),
                Series::from_points(periods.iter().copied().zip(values.iter().copied())),
            )
        }))
    }

    fn sector(name: &str) -> Sector {
        // Sample sector names are non-blank literals.
        Sector::new(name).unwrap_or_else(|_| unreachable!("blank sample sector"))
    }

    /// An industrial company with four years and five quarters of data.
    #[must_use]
    pub fn industrial() -> FetchedFinancials {
        FetchedFinancials {
            sector: sector("Industrials"),
            financials: Financials {
                annual_income: statement(
                    &YEARS,
                    &[
                        (li::TOTAL_REVENUE, &[1200.0, 1100.0, 1000.0, 950.0]),
                        (li::COST_OF_REVENUE, &[720.0, 670.0, 610.0, 580.0]),
                        (li::EBITDA, &[240.0, 210.0, 190.0, 170.0]),
                        (li::EBIT, &[180.0, 160.0, 140.0, 125.0]),
                        (li::INTEREST_EXPENSE, &[20.0, 22.0, 21.0, 20.0]),
                    ],
                ),
                quarterly_income: statement(
                    &QUARTERS,
                    &[
                        (li::TOTAL_REVENUE, &[310.0, 305.0, 295.0, 290.0, 280.0]),
                        (li::COST_OF_REVENUE, &[186.0, 183.0, 177.0, 174.0, 168.0]),
                        (li::EBITDA, &[62.0, 61.0, 58.0, 57.0, 55.0]),
                        (li::EBIT, &[47.0, 46.0, 44.0, 43.0, 41.0]),
                        (li::INTEREST_EXPENSE, &[5.0, 5.0, 5.5, 5.5, 5.0]),
                    ],
                ),
                annual_balance_sheet: statement(
                    &YEARS,
                    &[
                        (li::NET_DEBT, &[300.0, 320.0, 340.0, 350.0]),
                        (li::TOTAL_DEBT, &[450.0, 470.0, 480.0, 490.0]),
                        (li::INVENTORY, &[150.0, 140.0, 135.0, 130.0]),
                        (li::CASH, &[120.0, 110.0, 100.0, 95.0]),
                        (li::SHORT_TERM_INVESTMENTS, &[30.0, 40.0, 40.0, 45.0]),
                        (li::ACCOUNTS_RECEIVABLE, &[160.0, 150.0, 140.0, 135.0]),
                    ],
                ),
                quarterly_balance_sheet: statement(
                    &QUARTERS,
                    &[
                        (li::NET_DEBT, &[300.0, 305.0, 310.0, 315.0, 320.0]),
                        (li::TOTAL_DEBT, &[450.0, 455.0, 460.0, 465.0, 470.0]),
                        (li::INVENTORY, &[150.0, 148.0, 145.0, 142.0, 140.0]),
                        (li::CASH, &[120.0, 118.0, 115.0, 112.0, 110.0]),
                        (li::SHORT_TERM_INVESTMENTS, &[30.0, 32.0, 35.0, 38.0, 40.0]),
                        (li::ACCOUNTS_RECEIVABLE, &[160.0, 158.0, 155.0, 152.0, 150.0]),
                    ],
                ),
            },
        }
    }

    /// A bank with four years and five quarters of data.
    #[must_use]
    pub fn bank() -> FetchedFinancials {
        FetchedFinancials {
            sector: sector(FINANCIAL_SERVICES),
            financials: Financials {
                annual_income: statement(
                    &YEARS,
                    &[
                        (li::NET_INTEREST_INCOME, &[500.0, 470.0, 440.0, 420.0]),
                        (li::TOTAL_REVENUE, &[800.0, 760.0, 720.0, 690.0]),
                        (li::SGA, &[250.0, 240.0, 235.0, 230.0]),
                        (li::OTHER_NON_INTEREST_EXPENSE, &[180.0, 175.0, 170.0, 165.0]),
                        (li::NET_INCOME, &[200.0, 185.0, 170.0, 160.0]),
                    ],
                ),
                quarterly_income: statement(
                    &QUARTERS,
                    &[
                        (li::NET_INTEREST_INCOME, &[128.0, 126.0, 124.0, 122.0, 120.0]),
                        (li::TOTAL_REVENUE, &[205.0, 202.0, 198.0, 195.0, 192.0]),
                        (li::SGA, &[63.0, 63.0, 62.0, 62.0, 61.0]),
                        (li::OTHER_NON_INTEREST_EXPENSE, &[45.0, 45.0, 45.0, 45.0, 44.0]),
                        (li::NET_INCOME, &[51.0, 50.0, 50.0, 49.0, 47.0]),
                    ],
                ),
                annual_balance_sheet: statement(
                    &YEARS,
                    &[
                        (li::TOTAL_EQUITY, &[1500.0, 1420.0, 1350.0, 1300.0]),
                        (li::TOTAL_ASSETS, &[15000.0, 14500.0, 14000.0, 13600.0]),
                    ],
                ),
                quarterly_balance_sheet: statement(
                    &QUARTERS,
                    &[
                        (li::TOTAL_EQUITY, &[1500.0, 1480.0, 1460.0, 1440.0, 1420.0]),
                        (li::TOTAL_ASSETS, &[15000.0, 14900.0, 14800.0, 14650.0, 14500.0]),
                    ],
                ),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::screening::{Regime, SectorClass, route};

    #[tokio::test]
    async fn samples_are_seeded_and_unknown_fails() {
        let provider = InMemoryDataProvider::with_samples();
        assert_eq!(provider.len(), 2);

        let bank = provider.fetch(&Ticker::new("BANKCO")).await.unwrap();
        assert_eq!(bank.sector.class(), SectorClass::Financial);

        let result = provider.fetch(&Ticker::new("ZZZ")).await;
        assert!(matches!(result, Err(DataProviderError::UnknownTicker { .. })));
    }

    #[test]
    fn industrial_sample_produces_finite_headline_metrics() {
        let acme = samples::industrial();
        let stage = route(Regime::Recession, Some(&acme.sector));
        let metrics = stage.compute(Some(&acme.financials));
        assert!(!metrics.is_empty());
        assert!(metrics.headline().any(|(_, v)| v.is_finite()));
    }
}
