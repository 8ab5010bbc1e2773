//! Environment validation at startup.

use std::path::Path;

use super::{Config, DataProviderKind, LlmProviderKind};

/// Errors from environment validation at startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupValidationError {
    /// Missing required credentials for the selected adapter.
    #[error("Missing required credentials for {adapter}: {details}")]
    MissingCredentials {
        /// The adapter that needs them.
        adapter: String,
        /// Details about which credentials are missing.
        details: String,
    },

    /// Invalid environment configuration.
    #[error("Invalid environment configuration: {0}")]
    InvalidConfiguration(String),
}

/// Result of startup environment validation.
#[derive(Debug)]
pub struct StartupValidation {
    /// Whether validation passed.
    pub valid: bool,
    /// Warning messages (non-fatal).
    pub warnings: Vec<String>,
}

impl StartupValidation {
    /// Create a successful validation result.
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            valid: true,
            warnings: Vec::new(),
        }
    }

    /// Create a successful validation with warnings.
    #[must_use]
    pub const fn ok_with_warnings(warnings: Vec<String>) -> Self {
        Self {
            valid: true,
            warnings,
        }
    }
}

/// Check that the selected adapters can run in this environment.
///
/// - the OpenAI adapter needs an API key
/// - the fixture provider needs its directory
///
/// # Errors
///
/// Returns `StartupValidationError` if a required credential or directory is
/// missing.
pub fn validate_startup_environment(
    config: &Config,
) -> Result<StartupValidation, StartupValidationError> {
    let mut warnings = Vec::new();

    match config.llm.provider {
        LlmProviderKind::Openai => {
            if config.llm.api_key.trim().is_empty() {
                return Err(StartupValidationError::MissingCredentials {
                    adapter: "openai".to_string(),
                    details: "llm.api_key is empty. Set OPENAI_API_KEY in your environment \
                              or config.yaml."
                        .to_string(),
                });
            }
        }
        LlmProviderKind::Scripted => {
            if !config.llm.api_key.is_empty() {
                warnings.push("LLM API key configured but not used by the scripted provider".to_string());
            }
        }
    }

    match config.provider.kind {
        DataProviderKind::Fixture => {
            if !Path::new(&config.provider.fixture_dir).is_dir() {
                return Err(StartupValidationError::InvalidConfiguration(format!(
                    "provider.fixture_dir '{}' is not a directory",
                    config.provider.fixture_dir
                )));
            }
        }
        DataProviderKind::InMemory => {
            warnings.push("Using built-in sample financials".to_string());
        }
    }

    if warnings.is_empty() {
        Ok(StartupValidation::ok())
    } else {
        Ok(StartupValidation::ok_with_warnings(warnings))
    }
}
