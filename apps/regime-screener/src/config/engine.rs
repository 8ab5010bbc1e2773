//! Workflow engine configuration.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::application::workflow::{DEFAULT_STAGE_CONCURRENCY, EngineSettings, StageTimeouts};
use crate::domain::screening::StageTag;

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Concurrent invocations per stage.
    #[serde(default = "default_concurrency")]
    pub default_concurrency: usize,
    /// Per-stage overrides, keyed by stage tag (`validate`, `evaluate`, ...).
    #[serde(default)]
    pub stage_concurrency: HashMap<StageTag, usize>,
    /// Data provider fetch timeout in seconds.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    /// Validation and evaluation timeout in seconds.
    #[serde(default = "default_llm_timeout_secs")]
    pub llm_timeout_secs: u64,
    /// Abandon unfinished tickers after this many seconds. Unset means no deadline.
    #[serde(default)]
    pub run_deadline_secs: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_concurrency: default_concurrency(),
            stage_concurrency: HashMap::new(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            llm_timeout_secs: default_llm_timeout_secs(),
            run_deadline_secs: None,
        }
    }
}

impl EngineConfig {
    /// Settings for [`crate::application::workflow::WorkflowEngine`].
    #[must_use]
    pub fn settings(&self) -> EngineSettings {
        EngineSettings {
            default_concurrency: self.default_concurrency,
            stage_concurrency: self.stage_concurrency.clone(),
            run_deadline: self.run_deadline_secs.map(Duration::from_secs),
        }
    }

    /// Timeouts for the external-call stages.
    #[must_use]
    pub const fn timeouts(&self) -> StageTimeouts {
        StageTimeouts {
            fetch: Duration::from_secs(self.fetch_timeout_secs),
            llm: Duration::from_secs(self.llm_timeout_secs),
        }
    }
}

const fn default_concurrency() -> usize {
    DEFAULT_STAGE_CONCURRENCY
}

const fn default_fetch_timeout_secs() -> u64 {
    60
}

const fn default_llm_timeout_secs() -> u64 {
    180
}
