//! Financial data provider configuration.

use serde::{Deserialize, Serialize};

/// Which data adapter to wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataProviderKind {
    /// One JSON document per ticker under `fixture_dir`.
    #[default]
    Fixture,
    /// Built-in sample companies.
    InMemory,
}

/// Data provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Adapter to use.
    #[serde(default)]
    pub kind: DataProviderKind,
    /// Directory holding `<TICKER>.json` documents.
    #[serde(default = "default_fixture_dir")]
    pub fixture_dir: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: DataProviderKind::default(),
            fixture_dir: default_fixture_dir(),
        }
    }
}

fn default_fixture_dir() -> String {
    "fixtures".to_string()
}
