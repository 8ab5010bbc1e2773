//! Screening Bounded Context
//!
//! Evaluates tickers against a macro-economic regime.
//!
//! # Key Concepts
//!
//! - **EntityState Aggregate**: one ticker's statements, metrics, commentary
//!   and evaluation, with a forward-only status
//! - **Router**: pure (regime, sector) → metric stage mapping
//! - **Metric Calculators**: total functions from statements to headline metrics
//! - **Workflow Events**: stage transitions that drive the engine

pub mod aggregate;
pub mod events;
pub mod services;
pub mod value_objects;

pub use aggregate::{EntityMutation, EntityState};
pub use events::{StageTag, WorkflowEvent};
pub use services::{MetricBreakdown, MetricStage, route};
pub use value_objects::{
    CriteriaRow, EntityStatus, Evaluation, FINANCIAL_SERVICES, Financials, MetricSet, MetricValue, OutlierBound,
    OutlierFlag, OutlierKind, Regime, Sector, SectorClass, Series, Statement, StatementKind,
    SupplementalValue, criteria_for, flag_outliers, labels, outlier_table, render_criteria,
    render_outlier_table,
};
