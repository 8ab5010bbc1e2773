//! Observability configuration for logging and metrics.

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

use crate::observability::{LogFormat, MetricsConfig, TracingConfig};

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ObservabilityConfig {
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Prometheus exporter configuration.
    #[serde(default)]
    pub metrics: MetricsExporterConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format.
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Include span information.
    #[serde(default = "default_true")]
    pub include_spans: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            include_spans: true,
        }
    }
}

impl LoggingConfig {
    /// Subscriber configuration.
    #[must_use]
    pub fn tracing(&self) -> TracingConfig {
        TracingConfig {
            level: self.level.clone(),
            format: LogFormat::parse(&self.format),
            include_spans: self.include_spans,
        }
    }
}

/// Prometheus exporter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsExporterConfig {
    /// Install the exporter.
    #[serde(default)]
    pub enabled: bool,
    /// Scrape listener address.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
}

impl Default for MetricsExporterConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: default_listen_addr(),
        }
    }
}

impl MetricsExporterConfig {
    /// Exporter configuration.
    #[must_use]
    pub fn exporter(&self) -> MetricsConfig {
        MetricsConfig::with_addr(self.listen_addr)
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

const fn default_true() -> bool {
    true
}

fn default_listen_addr() -> SocketAddr {
    MetricsConfig::default().listen_addr
}
