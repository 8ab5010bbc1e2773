//! Prometheus metrics for the screening workflow.
//!
//! Covers stage executions, run outcomes, LLM calls and data fetches. All
//! recorders are no-ops until a recorder is installed with [`init_metrics`].
//!
//! # Example
//!
//! ```ignore
//! use regime_screener::observability::{init_metrics, MetricsConfig};
//!
//! let config = MetricsConfig::default();
//! init_metrics(&config).expect("Failed to initialize metrics");
//!
//! record_stage_run("evaluate", "ok", 1.25);
//! ```

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Configuration for the metrics exporter.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Address to bind the metrics HTTP listener.
    pub listen_addr: SocketAddr,
    /// Histogram buckets for latency measurements (in seconds).
    pub latency_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 9090)),
            // Stage latencies range from microseconds (metrics) to minutes (LLM)
            latency_buckets: vec![
                0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 180.0,
            ],
        }
    }
}

impl MetricsConfig {
    /// Create a new metrics configuration with custom address.
    #[must_use]
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            listen_addr: addr,
            ..Default::default()
        }
    }
}

/// Initialize the Prometheus metrics exporter.
///
/// This starts an HTTP server that exposes metrics at `/metrics`.
///
/// # Errors
///
/// Returns an error if the metrics exporter fails to start (e.g., port already in use).
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    PrometheusBuilder::new()
        .with_http_listener(config.listen_addr)
        .set_buckets(&config.latency_buckets)
        .map_err(|e| MetricsError::Configuration(e.to_string()))?
        .install()
        .map_err(|e| MetricsError::Installation(e.to_string()))?;

    tracing::info!(
        addr = %config.listen_addr,
        "Prometheus metrics exporter started"
    );

    Ok(())
}

/// Error type for metrics operations.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to configure metrics exporter.
    #[error("metrics configuration error: {0}")]
    Configuration(String),
    /// Failed to install metrics exporter.
    #[error("metrics installation error: {0}")]
    Installation(String),
}

// ============================================================================
// Workflow Metrics
// ============================================================================

/// Record one stage execution.
///
/// # Arguments
///
/// * `stage` - Stage tag (e.g., "fetch", "evaluate")
/// * `outcome` - "ok", "error", "timeout" or "panic"
/// * `duration_seconds` - Wall time of the handler
pub fn record_stage_run(stage: &str, outcome: &str, duration_seconds: f64) {
    counter!(
        "stage_runs_total",
        "stage" => stage.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);

    histogram!("stage_duration_seconds", "stage" => stage.to_string()).record(duration_seconds);
}

/// Update the in-flight gauge for a stage.
pub fn update_stage_in_flight(stage: &str, count: usize) {
    #[allow(clippy::cast_precision_loss)]
    gauge!("stage_in_flight", "stage" => stage.to_string()).set(count as f64);
}

/// Record a finished run.
///
/// # Arguments
///
/// * `outcome` - "completed", "deadline", "cancelled" or "failed"
/// * `entities` - Number of distinct tickers in the run
/// * `duration_seconds` - Wall time of the run
pub fn record_run(outcome: &str, entities: usize, duration_seconds: f64) {
    counter!("runs_total", "outcome" => outcome.to_string()).increment(1);
    counter!("run_entities_total", "outcome" => outcome.to_string()).increment(entities as u64);
    histogram!("run_duration_seconds").record(duration_seconds);
}

/// Record an entity passing the barrier.
///
/// # Arguments
///
/// * `outcome` - "completed" or "abandoned"
pub fn record_entity_done(outcome: &str) {
    counter!("entities_done_total", "outcome" => outcome.to_string()).increment(1);
}

// ============================================================================
// Adapter Metrics
// ============================================================================

/// Record an LLM request.
///
/// # Arguments
///
/// * `call` - "structured" or "agent"
/// * `status` - "ok" or an error class
/// * `latency_seconds` - Round-trip time including retries
pub fn record_llm_request(call: &str, status: &str, latency_seconds: f64) {
    counter!(
        "llm_requests_total",
        "call" => call.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!("llm_latency_seconds", "call" => call.to_string()).record(latency_seconds);
}

/// Record a retried LLM request.
pub fn record_llm_retry(reason: &str) {
    counter!("llm_retries_total", "reason" => reason.to_string()).increment(1);
}

/// Record a financial data fetch.
///
/// # Arguments
///
/// * `provider` - Adapter name (e.g., "fixture")
/// * `status` - "ok" or an error class
pub fn record_data_fetch(provider: &str, status: &str) {
    counter!(
        "data_fetches_total",
        "provider" => provider.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

// ============================================================================
// Tests
// ============================================================================
