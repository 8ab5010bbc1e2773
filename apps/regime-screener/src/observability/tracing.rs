//! Structured logging for the screener.
//!
//! Builds a `tracing-subscriber` registry with an `EnvFilter` and either a
//! JSON or a human-readable formatter.
//!
//! # Example
//!
//! ```ignore
//! use regime_screener::observability::{init_tracing, TracingConfig};
//!
//! let config = TracingConfig::default();
//! init_tracing(&config).expect("Failed to initialize tracing");
//! ```
//!
//! # Key Spans
//!
//! - `screening.run` - One run from seed to report
//! - `screening.stage` - One stage handler invocation

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Human-readable, colored when attached to a terminal.
    Pretty,
}

impl LogFormat {
    /// Parse a format name; anything other than "pretty"/"text" is JSON.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" | "console" => Self::Pretty,
            _ => Self::Json,
        }
    }
}

/// Configuration for the tracing subscriber.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
    /// Emit span close events with timings.
    pub include_spans: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Json,
            include_spans: true,
        }
    }
}

impl TracingConfig {
    /// Create a configuration with a custom level.
    #[must_use]
    pub fn with_level(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Default::default()
        }
    }

    /// Use the human-readable formatter.
    #[must_use]
    pub const fn pretty(mut self) -> Self {
        self.format = LogFormat::Pretty;
        self
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level))
    }
}

/// Error type for tracing operations.
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    /// Failed to initialize tracing subscriber.
    #[error("failed to initialize tracing subscriber: {0}")]
    SubscriberError(String),
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `config.level`.
///
/// # Errors
///
/// Returns an error if a global subscriber has already been set.
pub fn init_tracing(config: &TracingConfig) -> Result<(), TracingError> {
    let span_events = if config.include_spans {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let result = match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(config.filter())
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(config.include_spans)
                    .with_span_events(span_events),
            )
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(config.filter())
            .with(tracing_subscriber::fmt::layer().with_span_events(span_events))
            .try_init(),
    };
    result.map_err(|e| TracingError::SubscriberError(e.to_string()))?;

    tracing::debug!(level = %config.level, format = ?config.format, "Tracing initialized");
    Ok(())
}

// ============================================================================
// Span attribute helpers
// ============================================================================

/// Common span attribute keys for screening operations.
pub mod span_attrs {
    /// Run ID attribute key.
    pub const RUN_ID: &str = "run.id";
    /// Regime attribute key.
    pub const REGIME: &str = "run.regime";
    /// Ticker attribute key.
    pub const TICKER: &str = "entity.ticker";
    /// Stage tag attribute key.
    pub const STAGE: &str = "stage.tag";
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TracingConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.include_spans);
    }

    #[test]
    fn test_config_builder() {
        let config = TracingConfig::with_level("debug").pretty();
        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Pretty);
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse(" Text "), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("anything"), LogFormat::Json);
    }

    #[test]
    fn test_tracing_error_display() {
        let err = TracingError::SubscriberError("already initialized".to_string());
        assert!(err.to_string().contains("already initialized"));
    }
}
