//! Entity aggregate: everything known about one ticker during a run.

use serde::Serialize;
use std::sync::Arc;

use crate::domain::screening::services::MetricStage;
use crate::domain::screening::value_objects::{
    EntityStatus, Evaluation, Financials, MetricSet, Sector, SectorClass,
};
use crate::domain::shared::{DomainError, Ticker};

/// A state change produced by a stage and committed by the engine.
///
/// Stages never mutate an [`EntityState`] directly; they return one of these
/// and the engine applies it under the run lock.
#[derive(Debug, Clone)]
pub enum EntityMutation {
    /// Statements fetched.
    Fetched {
        /// Reported sector.
        sector: Sector,
        /// The four statements.
        financials: Arc<Financials>,
    },
    /// Fetch failed; the entity continues without data.
    FetchFailed {
        /// Why the fetch failed.
        reason: String,
    },
    /// Metric stage selected.
    Routed {
        /// Selected stage.
        stage: MetricStage,
    },
    /// Metrics computed (possibly empty).
    MetricsComputed {
        /// The metric set.
        metrics: MetricSet,
    },
    /// Validation finished.
    Validated {
        /// Agent commentary; `None` when skipped or failed.
        commentary: Option<String>,
        /// Accessor calls the agent made, in order.
        tool_calls: Vec<String>,
    },
    /// Evaluation finished.
    Evaluated {
        /// The evaluation.
        evaluation: Evaluation,
    },
    /// Counted by the barrier.
    Completed,
    /// Run deadline elapsed before the entity finished.
    Abandoned {
        /// Why the entity was abandoned.
        reason: String,
    },
}

impl EntityMutation {
    /// Status the entity moves to when this mutation is applied.
    #[must_use]
    pub const fn target_status(&self) -> EntityStatus {
        match self {
            Self::Fetched { .. } | Self::FetchFailed { .. } => EntityStatus::Fetched,
            Self::Routed { .. } => EntityStatus::Routed,
            Self::MetricsComputed { .. } => EntityStatus::MetricsComputed,
            Self::Validated { .. } => EntityStatus::Validated,
            Self::Evaluated { .. } => EntityStatus::Evaluated,
            Self::Completed | Self::Abandoned { .. } => EntityStatus::Done,
        }
    }

    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Fetched { .. } => "fetched",
            Self::FetchFailed { .. } => "fetch_failed",
            Self::Routed { .. } => "routed",
            Self::MetricsComputed { .. } => "metrics_computed",
            Self::Validated { .. } => "validated",
            Self::Evaluated { .. } => "evaluated",
            Self::Completed => "completed",
            Self::Abandoned { .. } => "abandoned",
        }
    }
}

/// Per-ticker state. Each field is written at most once, and the status
/// only moves forward.
#[derive(Debug, Clone, Serialize)]
pub struct EntityState {
    ticker: Ticker,
    status: EntityStatus,
    sector: Option<Sector>,
    #[serde(skip)]
    financials: Option<Arc<Financials>>,
    fetch_error: Option<String>,
    route: Option<MetricStage>,
    metrics: MetricSet,
    commentary: Option<String>,
    tool_calls: Vec<String>,
    evaluation: Option<Evaluation>,
    abandoned: Option<String>,
}

impl EntityState {
    /// New entity in `Pending`.
    #[must_use]
    pub fn new(ticker: Ticker) -> Self {
        Self {
            ticker,
            status: EntityStatus::Pending,
            sector: None,
            financials: None,
            fetch_error: None,
            route: None,
            metrics: MetricSet::empty(),
            commentary: None,
            tool_calls: Vec::new(),
            evaluation: None,
            abandoned: None,
        }
    }

    /// Apply a mutation, advancing the status by exactly one step.
    ///
    /// `Abandoned` is the only mutation that may skip ahead; it moves any
    /// unfinished entity straight to `Done`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStateTransition` if the mutation does not
    /// target the next status in the pipeline.
    pub fn apply(&mut self, mutation: EntityMutation) -> Result<(), DomainError> {
        let next = mutation.target_status();
        let allowed = match mutation {
            EntityMutation::Abandoned { .. } => !self.status.is_terminal(),
            _ => self.status.can_transition_to(next),
        };
        if !allowed {
            return Err(DomainError::InvalidStateTransition {
                entity: format!("EntityState[{}]", self.ticker),
                from: self.status.to_string(),
                to: next.to_string(),
                reason: format!("'{}' cannot be applied in this state", mutation.name()),
            });
        }

        match mutation {
            EntityMutation::Fetched { sector, financials } => {
                self.sector = Some(sector);
                self.financials = Some(financials);
            }
            EntityMutation::FetchFailed { reason } => {
                self.fetch_error = Some(reason);
            }
            EntityMutation::Routed { stage } => {
                self.route = Some(stage);
            }
            EntityMutation::MetricsComputed { metrics } => {
                self.metrics = metrics;
            }
            EntityMutation::Validated {
                commentary,
                tool_calls,
            } => {
                self.commentary = commentary;
                self.tool_calls = tool_calls;
            }
            EntityMutation::Evaluated { evaluation } => {
                self.evaluation = Some(evaluation);
            }
            EntityMutation::Completed => {}
            EntityMutation::Abandoned { reason } => {
                self.abandoned = Some(reason);
            }
        }
        self.status = next;
        Ok(())
    }

    /// Ticker.
    #[must_use]
    pub const fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> EntityStatus {
        self.status
    }

    /// Sector, once fetched.
    #[must_use]
    pub const fn sector(&self) -> Option<&Sector> {
        self.sector.as_ref()
    }

    /// Sector class; non-financial until a sector is known.
    #[must_use]
    pub fn sector_class(&self) -> SectorClass {
        SectorClass::of(self.sector.as_ref())
    }

    /// Raw statements, when the fetch succeeded.
    #[must_use]
    pub fn financials(&self) -> Option<&Arc<Financials>> {
        self.financials.as_ref()
    }

    /// Fetch failure reason, if any.
    #[must_use]
    pub fn fetch_error(&self) -> Option<&str> {
        self.fetch_error.as_deref()
    }

    /// Selected metric stage.
    #[must_use]
    pub const fn route(&self) -> Option<MetricStage> {
        self.route
    }

    /// Metrics (empty until computed, or when unmeasurable).
    #[must_use]
    pub const fn metrics(&self) -> &MetricSet {
        &self.metrics
    }

    /// Validation commentary.
    #[must_use]
    pub fn commentary(&self) -> Option<&str> {
        self.commentary.as_deref()
    }

    /// Validation agent call log.
    #[must_use]
    pub fn tool_calls(&self) -> &[String] {
        &self.tool_calls
    }

    /// Evaluation, once written.
    #[must_use]
    pub const fn evaluation(&self) -> Option<&Evaluation> {
        self.evaluation.as_ref()
    }

    /// Why the entity was abandoned, if the run deadline cut it short.
    #[must_use]
    pub fn abandoned(&self) -> Option<&str> {
        self.abandoned.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::screening::value_objects::Regime;

    fn fetched() -> EntityMutation {
        EntityMutation::Fetched {
            sector: Sector::new("Technology").unwrap(),
            financials: Arc::new(Financials::default()),
        }
    }

    #[test]
    fn full_pipeline_moves_forward() {
        let mut entity = EntityState::new(Ticker::new("AAPL"));
        entity.apply(fetched()).unwrap();
        entity
            .apply(EntityMutation::Routed {
                stage: MetricStage::Expansion,
            })
            .unwrap();
        entity
            .apply(EntityMutation::MetricsComputed {
                metrics: MetricSet::empty().with_metric("EBITDA Margin", 0.3),
            })
            .unwrap();
        entity
            .apply(EntityMutation::Validated {
                commentary: Some("looks fine".to_string()),
                tool_calls: vec!["Called Annual Income".to_string()],
            })
            .unwrap();
        entity
            .apply(EntityMutation::Evaluated {
                evaluation: Evaluation::new("good", 80),
            })
            .unwrap();
        entity.apply(EntityMutation::Completed).unwrap();

        assert_eq!(entity.status(), EntityStatus::Done);
        assert_eq!(entity.route(), Some(MetricStage::Expansion));
        assert_eq!(entity.metrics().len(), 1);
        assert_eq!(entity.commentary(), Some("looks fine"));
        assert_eq!(entity.tool_calls(), ["Called Annual Income".to_string()]);
        assert!(entity.abandoned().is_none());
        assert_eq!(entity.evaluation().map(Evaluation::score), Some(80));
    }

    #[test]
    fn status_never_regresses() {
        let mut entity = EntityState::new(Ticker::new("AAPL"));
        entity.apply(fetched()).unwrap();
        entity
            .apply(EntityMutation::Routed {
                stage: MetricStage::Financial(Regime::Expansion),
            })
            .unwrap();
        let Err(err) = entity.apply(fetched()) else {
            panic!("expected regression to be rejected");
        };
        assert!(err.to_string().contains("ROUTED"));
        assert_eq!(entity.status(), EntityStatus::Routed);
    }

    #[test]
    fn pending_cannot_skip_to_later_stages() {
        let mut entity = EntityState::new(Ticker::new("AAPL"));
        assert!(entity
            .apply(EntityMutation::Evaluated {
                evaluation: Evaluation::new("early", 90),
            })
            .is_err());
        assert!(entity.apply(EntityMutation::Completed).is_err());
        assert_eq!(entity.status(), EntityStatus::Pending);
        assert!(entity.evaluation().is_none());
    }

    #[test]
    fn routed_cannot_skip_to_done() {
        let mut entity = EntityState::new(Ticker::new("AAPL"));
        entity.apply(fetched()).unwrap();
        entity
            .apply(EntityMutation::Routed {
                stage: MetricStage::Inflation,
            })
            .unwrap();

        let Err(err) = entity.apply(EntityMutation::Completed) else {
            panic!("expected skip to be rejected");
        };
        assert!(err.to_string().contains("ROUTED -> DONE"));
        assert!(entity
            .apply(EntityMutation::Validated {
                commentary: None,
                tool_calls: Vec::new(),
            })
            .is_err());
        assert_eq!(entity.status(), EntityStatus::Routed);
    }

    #[test]
    fn fields_are_written_once() {
        let mut entity = EntityState::new(Ticker::new("AAPL"));
        entity
            .apply(EntityMutation::FetchFailed {
                reason: "unknown ticker".to_string(),
            })
            .unwrap();
        assert!(entity
            .apply(EntityMutation::FetchFailed {
                reason: "again".to_string(),
            })
            .is_err());
        assert_eq!(entity.fetch_error(), Some("unknown ticker"));
    }

    #[test]
    fn abandon_jumps_to_done() {
        let mut entity = EntityState::new(Ticker::new("AAPL"));
        entity
            .apply(EntityMutation::Abandoned {
                reason: "deadline".to_string(),
            })
            .unwrap();
        assert!(entity.status().is_terminal());
        assert!(entity.evaluation().is_none());
        assert_eq!(entity.abandoned(), Some("deadline"));
        assert!(entity.apply(EntityMutation::Completed).is_err());
        assert!(entity
            .apply(EntityMutation::Abandoned {
                reason: "again".to_string(),
            })
            .is_err());
    }

    #[test]
    fn sector_class_defaults_to_non_financial() {
        let entity = EntityState::new(Ticker::new("ZZZZ"));
        assert_eq!(entity.sector_class(), SectorClass::NonFinancial);
    }
}
