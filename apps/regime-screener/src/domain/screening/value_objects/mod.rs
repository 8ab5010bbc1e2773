//! Screening value objects.

mod criteria;
mod entity_status;
mod evaluation;
mod financials;
pub mod labels;
mod metric_set;
mod metric_value;
mod outliers;
mod regime;
mod sector;

pub use criteria::{CriteriaRow, criteria_for, render_criteria};
pub use entity_status::EntityStatus;
pub use evaluation::{Evaluation, MAX_SCORE, NO_METRICS};
pub use financials::{Financials, RawStatement, Series, Statement, StatementKind};
pub use metric_set::{MetricSet, SupplementalGroup, SupplementalValue};
pub use metric_value::MetricValue;
pub use outliers::{
    MetricUnit, OutlierBound, OutlierFlag, OutlierKind, flag_outliers, outlier_table,
    render_outlier_table,
};
pub use regime::Regime;
pub use sector::{FINANCIAL_SERVICES, Sector, SectorClass};
