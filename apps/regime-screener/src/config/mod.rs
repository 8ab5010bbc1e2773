//! Configuration module for the regime screener.
//!
//! YAML loading with `${VAR}` / `${VAR:-default}` environment interpolation,
//! followed by validation.
//!
//! # Usage
//!
//! ```rust,ignore
//! use regime_screener::config::load_config;
//!
//! // Load from default path (config.yaml)
//! let config = load_config(None)?;
//!
//! // Load from custom path
//! let config = load_config(Some("custom/config.yaml"))?;
//!
//! println!("validate concurrency: {}", config.engine.settings().concurrency(StageTag::Validate));
//! ```

mod engine;
mod llm;
mod observability;
mod provider;
mod validation;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use engine::EngineConfig;
pub use llm::{LlmConfig, LlmProviderKind, RetryConfig};
pub use observability::{LoggingConfig, MetricsExporterConfig, ObservabilityConfig};
pub use provider::{DataProviderKind, ProviderConfig};
pub use validation::{StartupValidation, StartupValidationError, validate_startup_environment};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Workflow engine configuration.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Language model configuration.
    #[serde(default)]
    pub llm: LlmConfig,
    /// Financial data provider configuration.
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to "config.yaml".
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or("config.yaml");

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is compile-time constant; expect() is safe here
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let mut result = input.to_string();

    // Match ${VAR} or ${VAR:-default} patterns
    let re = ENV_VAR_REGEX.get_or_init(|| {
        // This regex pattern is compile-time constant and always valid
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    for cap in re.captures_iter(input) {
        // Group 0 and group 1 are guaranteed by the regex pattern structure
        let Some(full_match) = cap.get(0) else {
            continue;
        };
        let Some(var_match) = cap.get(1) else {
            continue;
        };
        let full_match = full_match.as_str();
        let var_name = var_match.as_str();
        let default_value = cap.get(2).map(|m| m.as_str());

        let value = match std::env::var(var_name) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.map_or_else(String::new, str::to_string),
        };

        result = result.replace(full_match, &value);
    }

    result
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let engine = &config.engine;
    if engine.default_concurrency == 0 {
        return Err(ConfigError::ValidationError(
            "engine.default_concurrency must be positive".to_string(),
        ));
    }

    if let Some((tag, _)) = engine.stage_concurrency.iter().find(|(_, n)| **n == 0) {
        return Err(ConfigError::ValidationError(format!(
            "engine.stage_concurrency.{tag} must be positive"
        )));
    }

    if engine.fetch_timeout_secs == 0 || engine.llm_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "engine timeouts must be positive".to_string(),
        ));
    }

    if engine.run_deadline_secs == Some(0) {
        return Err(ConfigError::ValidationError(
            "engine.run_deadline_secs must be positive when set".to_string(),
        ));
    }

    let llm = &config.llm;
    if !(0.0..=2.0).contains(&llm.temperature) {
        return Err(ConfigError::ValidationError(
            "llm.temperature must be between 0.0 and 2.0".to_string(),
        ));
    }

    if llm.max_tool_rounds == 0 {
        return Err(ConfigError::ValidationError(
            "llm.max_tool_rounds must be positive".to_string(),
        ));
    }

    if llm.retry.max_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "llm.retry.max_attempts must be at least 1".to_string(),
        ));
    }

    if !(0.0..=1.0).contains(&llm.retry.jitter_factor) {
        return Err(ConfigError::ValidationError(
            "llm.retry.jitter_factor must be between 0.0 and 1.0".to_string(),
        ));
    }

    if llm.retry.backoff_multiplier < 1.0 {
        return Err(ConfigError::ValidationError(
            "llm.retry.backoff_multiplier must be at least 1.0".to_string(),
        ));
    }

    let valid_formats = ["json", "pretty", "text", "console"];
    let format = config.observability.logging.format.to_ascii_lowercase();
    if !valid_formats.contains(&format.as_str()) {
        return Err(ConfigError::ValidationError(format!(
            "observability.logging.format must be one of: {valid_formats:?}"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::screening::StageTag;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.engine.default_concurrency, 10);
        assert_eq!(config.engine.fetch_timeout_secs, 60);
        assert_eq!(config.engine.llm_timeout_secs, 180);
        assert!(config.engine.run_deadline_secs.is_none());
        assert_eq!(config.llm.provider, LlmProviderKind::Openai);
        assert_eq!(config.provider.kind, DataProviderKind::Fixture);
        assert!(!config.observability.metrics.enabled);
    }

    #[test]
    fn test_load_empty_config() {
        let config = match load_config_from_string("{}") {
            Ok(c) => c,
            Err(e) => panic!("should load empty config: {e}"),
        };
        assert_eq!(config.engine.default_concurrency, 10);
        assert_eq!(config.llm.max_tool_rounds, 8);
    }

    #[test]
    fn test_env_var_with_default_when_missing() {
        let input = "provider: ${SCREENER_CONFIG_TEST_NONEXISTENT_VAR:-scripted}";
        let result = interpolate_env_vars(input);

        assert_eq!(result, "provider: scripted");
    }

    #[test]
    #[expect(clippy::literal_string_with_formatting_args)] // ${...} is env var syntax, not format args
    fn test_env_var_with_default_uses_existing() {
        let input = "path: ${PATH:-default}";
        let result = interpolate_env_vars(input);

        assert_ne!(result, "path: default");
        assert!(result.starts_with("path: "));
    }

    #[test]
    fn test_env_var_without_default_becomes_empty() {
        let input = "api_key: ${SCREENER_CONFIG_TEST_UNLIKELY_TO_EXIST}";
        let result = interpolate_env_vars(input);

        assert_eq!(result, "api_key: ");
    }

    #[test]
    fn test_validation_zero_stage_concurrency() {
        let yaml = r"
engine:
  stage_concurrency:
    validate: 0
";

        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for zero concurrency");
        };
        assert!(err.to_string().contains("stage_concurrency.validate"));
    }

    #[test]
    fn test_validation_invalid_temperature() {
        let yaml = r"
llm:
  temperature: 3.5
";

        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for invalid temperature");
        };
        assert!(err.to_string().contains("temperature"));
    }

    #[test]
    fn test_validation_invalid_log_format() {
        let yaml = r"
observability:
  logging:
    format: xml
";

        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for invalid format");
        };
        assert!(err.to_string().contains("format"));
    }

    #[test]
    fn test_full_config_parse() {
        let yaml = r#"
engine:
  default_concurrency: 6
  stage_concurrency:
    validate: 2
    evaluate: 3
  fetch_timeout_secs: 30
  llm_timeout_secs: 90
  run_deadline_secs: 600

llm:
  provider: scripted
  base_url: "http://localhost:8080/v1"
  evaluation_model: "gpt-4.1"
  temperature: 0.2
  max_tool_rounds: 4
  retry:
    max_attempts: 5
    initial_backoff_ms: 100

provider:
  kind: in_memory
  fixture_dir: "data"

observability:
  logging:
    level: "debug"
    format: "pretty"
  metrics:
    enabled: true
    listen_addr: "127.0.0.1:9100"
"#;

        let config = match load_config_from_string(yaml) {
            Ok(c) => c,
            Err(e) => panic!("should load full config: {e}"),
        };

        let settings = config.engine.settings();
        assert_eq!(settings.concurrency(StageTag::Validate), 2);
        assert_eq!(settings.concurrency(StageTag::Evaluate), 3);
        assert_eq!(settings.concurrency(StageTag::Fetch), 6);
        assert_eq!(settings.run_deadline, Some(Duration::from_secs(600)));
        assert_eq!(config.engine.timeouts().llm, Duration::from_secs(90));

        assert_eq!(config.llm.provider, LlmProviderKind::Scripted);
        let openai = config.llm.openai();
        assert_eq!(openai.base_url, "http://localhost:8080/v1");
        assert_eq!(openai.evaluation_model, "gpt-4.1");
        assert_eq!(openai.max_tool_rounds, 4);
        assert_eq!(openai.retry.max_attempts, 5);
        assert_eq!(openai.retry.initial_backoff, Duration::from_millis(100));

        assert_eq!(config.provider.kind, DataProviderKind::InMemory);
        assert_eq!(config.provider.fixture_dir, "data");
        assert_eq!(config.observability.logging.level, "debug");
        assert!(config.observability.metrics.enabled);
        assert_eq!(
            config.observability.metrics.exporter().listen_addr.to_string(),
            "127.0.0.1:9100"
        );
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "engine:\n  default_concurrency: 3").unwrap();

        let config = load_config(file.path().to_str()).unwrap();
        assert_eq!(config.engine.default_concurrency, 3);
    }

    #[test]
    fn test_load_config_missing_file() {
        let Err(err) = load_config(Some("/nonexistent/screener.yaml")) else {
            panic!("expected read error");
        };
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }
}
