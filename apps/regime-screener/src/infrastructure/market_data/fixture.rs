//! Financial data read from a directory of JSON documents.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::document::FinancialsDocument;
use crate::application::ports::{DataProviderError, FetchedFinancials, FinancialDataPort};
use crate::domain::shared::Ticker;
use crate::observability::record_data_fetch;

/// Reads `<dir>/<TICKER>.json`. A missing file means an unknown ticker.
#[derive(Debug, Clone)]
pub struct FixtureDataProvider {
    dir: PathBuf,
}

impl FixtureDataProvider {
    /// Provider over `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory being read.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, ticker: &Ticker) -> PathBuf {
        self.dir.join(format!("{}.json", ticker.as_str()))
    }

    async fn load(&self, ticker: &Ticker) -> Result<FetchedFinancials, DataProviderError> {
        let path = self.path_for(ticker);
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(DataProviderError::UnknownTicker {
                    ticker: ticker.to_string(),
                });
            }
            Err(e) => {
                return Err(DataProviderError::DataUnavailable {
                    ticker: ticker.to_string(),
                    message: format!("{}: {e}", path.display()),
                });
            }
        };

        let document: FinancialsDocument =
            serde_json::from_str(&text).map_err(|e| DataProviderError::Malformed {
                ticker: ticker.to_string(),
                message: e.to_string(),
            })?;
        document
            .into_fetched()
            .map_err(|e| DataProviderError::Malformed {
                ticker: ticker.to_string(),
                message: e.to_string(),
            })
    }
}

#[async_trait]
impl FinancialDataPort for FixtureDataProvider {
    async fn fetch(&self, ticker: &Ticker) -> Result<FetchedFinancials, DataProviderError> {
        let result = self.load(ticker).await;
        let status = match &result {
            Ok(_) => "ok",
            Err(DataProviderError::UnknownTicker { .. }) => "unknown_ticker",
            Err(DataProviderError::Malformed { .. }) => "malformed",
            Err(_) => "error",
        };
        record_data_fetch("fixture", status);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::screening::SectorClass;
    use tempfile::TempDir;

    const DOC: &str = r#"{
        "sector": "Financial Services",
        "annual_income": {
            "NetIncome": {"2024-12-31": 200.0, "2023-12-31": null, "2022-12-31 00:00:00": 170.0}
        },
        "annual_balance_sheet": {
            "TotalAssets": {"2024-12-31": 15000.0}
        }
    }"#;

    #[tokio::test]
    async fn reads_document_and_normalizes_statements() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("BANKCO.json"), DOC).unwrap();
        let provider = FixtureDataProvider::new(dir.path());

        let fetched = provider.fetch(&Ticker::new("bankco")).await.unwrap();
        assert_eq!(fetched.sector.class(), SectorClass::Financial);
        let net_income = fetched.financials.annual_income.line("NetIncome");
        assert_eq!(net_income.len(), 3);
        assert!((net_income.latest() - 200.0).abs() < f64::EPSILON);
        assert!(net_income.get(1).is_nan());
        assert!(fetched.financials.quarterly_income.is_empty());
    }

    #[tokio::test]
    async fn missing_file_is_unknown_ticker() {
        let dir = TempDir::new().unwrap();
        let provider = FixtureDataProvider::new(dir.path());
        let result = provider.fetch(&Ticker::new("NOPE")).await;
        assert!(matches!(result, Err(DataProviderError::UnknownTicker { ticker }) if ticker == "NOPE"));
    }

    #[tokio::test]
    async fn invalid_json_is_malformed() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("BAD.json"), "{\"sector\": ").unwrap();
        let provider = FixtureDataProvider::new(dir.path());
        let result = provider.fetch(&Ticker::new("BAD")).await;
        assert!(matches!(result, Err(DataProviderError::Malformed { .. })));
    }

    #[tokio::test]
    async fn blank_sector_is_malformed() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("X.json"), r#"{"sector": "  "}"#).unwrap();
        let provider = FixtureDataProvider::new(dir.path());
        let result = provider.fetch(&Ticker::new("X")).await;
        assert!(matches!(result, Err(DataProviderError::Malformed { .. })));
    }
}
