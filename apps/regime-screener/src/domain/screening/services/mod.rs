//! Domain services for screening: routing and metric computation.

pub mod metrics;
pub mod router;

pub use metrics::MetricBreakdown;
pub use router::{MetricStage, route};
