//! Observability module for metrics and logging.
//!
//! Prometheus metrics for stage and adapter activity, plus the structured
//! logging subscriber.

mod metrics;
mod tracing;

pub use self::metrics::{
    MetricsConfig, MetricsError, init_metrics, record_data_fetch, record_entity_done,
    record_llm_request, record_llm_retry, record_run, record_stage_run, update_stage_in_flight,
};
pub use self::tracing::{LogFormat, TracingConfig, TracingError, init_tracing, span_attrs};
