//! Stage handlers.

mod aggregate;
mod evaluate;
mod fetch;
mod metrics;
mod route;
mod validate;

pub use aggregate::AggregateStage;
pub use evaluate::{EvaluateStage, parse_evaluation};
pub use fetch::{DEFAULT_FETCH_TIMEOUT, FetchStage};
pub use metrics::MetricsStage;
pub use route::RouteStage;
pub use validate::{DEFAULT_LLM_TIMEOUT, FinancialsAccessor, ValidateStage};
