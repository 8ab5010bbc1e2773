//! Run-wide state shared by all entities.
//!
//! Only the engine holds a `SharedState`, behind one lock. Every change goes
//! through [`SharedState::commit`], which applies a stage's mutation to a
//! single entity and feeds the barrier.

use std::collections::{BTreeMap, HashMap, HashSet};

use super::barrier::{Arrival, Barrier, BarrierState};
use super::error::WorkflowError;
use crate::application::dto::ScreeningReport;
use crate::domain::screening::{EntityMutation, EntityState, Regime};
use crate::domain::shared::{RunId, Ticker};

/// What a commit did.
#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    /// Mutation applied; the run continues.
    Applied,
    /// The mutation was a completion for an entity already counted.
    AlreadyCompleted,
    /// This commit finalized the barrier.
    Finalized(Box<ScreeningReport>),
}

/// State for one run.
#[derive(Debug)]
pub struct SharedState {
    run_id: RunId,
    regime: Regime,
    entity_ids: Vec<Ticker>,
    entities: HashMap<Ticker, EntityState>,
    barrier: Barrier,
}

impl SharedState {
    /// Create run state. Duplicate tickers collapse to their first occurrence.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::Configuration` if `tickers` is empty.
    pub fn new(
        run_id: RunId,
        regime: Regime,
        tickers: impl IntoIterator<Item = Ticker>,
    ) -> Result<Self, WorkflowError> {
        let mut seen = HashSet::new();
        let entity_ids: Vec<Ticker> = tickers
            .into_iter()
            .filter(|t| seen.insert(t.clone()))
            .collect();
        if entity_ids.is_empty() {
            return Err(WorkflowError::Configuration(
                "at least one ticker is required".to_string(),
            ));
        }

        let entities = entity_ids
            .iter()
            .map(|t| (t.clone(), EntityState::new(t.clone())))
            .collect();
        let barrier = Barrier::new(entity_ids.iter().cloned());

        Ok(Self {
            run_id,
            regime,
            entity_ids,
            entities,
            barrier,
        })
    }

    /// Run identifier.
    #[must_use]
    pub const fn run_id(&self) -> &RunId {
        &self.run_id
    }

    /// Regime being screened.
    #[must_use]
    pub const fn regime(&self) -> Regime {
        self.regime
    }

    /// Distinct tickers in submission order.
    #[must_use]
    pub fn entity_ids(&self) -> &[Ticker] {
        &self.entity_ids
    }

    /// Copy of an entity's current state.
    #[must_use]
    pub fn snapshot(&self, ticker: &Ticker) -> Option<EntityState> {
        self.entities.get(ticker).cloned()
    }

    /// Barrier state.
    #[must_use]
    pub const fn barrier_state(&self) -> BarrierState {
        self.barrier.state()
    }

    /// Entities that have not passed the barrier.
    #[must_use]
    pub fn unfinished(&self) -> Vec<Ticker> {
        self.entity_ids
            .iter()
            .filter(|t| !self.barrier.is_completed(t))
            .cloned()
            .collect()
    }

    /// Apply a stage's mutation to one entity.
    ///
    /// Completion mutations (`Completed`, `Abandoned`) are also counted by
    /// the barrier; the commit that releases it returns the report.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::UnknownEntity` for tickers outside the run and
    /// `WorkflowError::Domain` if the mutation would move the entity backwards.
    pub fn commit(
        &mut self,
        ticker: &Ticker,
        mutation: EntityMutation,
    ) -> Result<CommitOutcome, WorkflowError> {
        let completes = matches!(
            mutation,
            EntityMutation::Completed | EntityMutation::Abandoned { .. }
        );
        if completes && self.barrier.is_completed(ticker) {
            return Ok(CommitOutcome::AlreadyCompleted);
        }

        let entity = self
            .entities
            .get_mut(ticker)
            .ok_or_else(|| WorkflowError::UnknownEntity(ticker.to_string()))?;
        entity.apply(mutation)?;

        if completes {
            tracing::debug!(
                ticker = %ticker,
                route = ?entity.route(),
                tool_calls = ?entity.tool_calls(),
                abandoned = ?entity.abandoned(),
                "Entity finished"
            );
        }
        if !completes {
            return Ok(CommitOutcome::Applied);
        }
        match self.barrier.arrive(ticker)? {
            Arrival::Released => Ok(CommitOutcome::Finalized(Box::new(self.report()))),
            Arrival::Counted { .. } => Ok(CommitOutcome::Applied),
            Arrival::Duplicate => Ok(CommitOutcome::AlreadyCompleted),
        }
    }

    fn report(&self) -> ScreeningReport {
        let mut evaluations = BTreeMap::new();
        let mut metrics = BTreeMap::new();
        for ticker in &self.entity_ids {
            let entity = &self.entities[ticker];
            evaluations.insert(ticker.clone(), entity.evaluation().cloned());
            metrics.insert(ticker.clone(), entity.metrics().clone());
        }
        ScreeningReport {
            regime: self.regime,
            tickers: self.entity_ids.clone(),
            evaluations,
            metrics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::screening::{Evaluation, MetricSet, MetricStage};

    fn state(names: &[&str]) -> SharedState {
        SharedState::new(
            RunId::generate(),
            Regime::Recession,
            names.iter().map(|n| Ticker::new(*n)),
        )
        .unwrap()
    }

    fn finish(state: &mut SharedState, ticker: &Ticker, score: i64) -> CommitOutcome {
        let steps = [
            EntityMutation::FetchFailed {
                reason: "offline".to_string(),
            },
            EntityMutation::Routed {
                stage: MetricStage::Financial(Regime::Recession),
            },
            EntityMutation::MetricsComputed {
                metrics: MetricSet::empty().with_metric("ROE", 0.1),
            },
            EntityMutation::Validated {
                commentary: None,
                tool_calls: Vec::new(),
            },
            EntityMutation::Evaluated {
                evaluation: Evaluation::new("fine", score),
            },
        ];
        for step in steps {
            assert_eq!(state.commit(ticker, step).unwrap(), CommitOutcome::Applied);
        }
        state.commit(ticker, EntityMutation::Completed).unwrap()
    }

    #[test]
    fn empty_ticker_list_is_a_configuration_error() {
        let result = SharedState::new(RunId::generate(), Regime::Expansion, Vec::new());
        assert!(matches!(result, Err(WorkflowError::Configuration(_))));
    }

    #[test]
    fn duplicates_collapse_in_submission_order() {
        let state = state(&["B", "A", "B", "C", "A"]);
        let ids: Vec<_> = state.entity_ids().iter().map(Ticker::as_str).collect();
        assert_eq!(ids, vec!["B", "A", "C"]);
    }

    #[test]
    fn finalizes_once_with_every_ticker_keyed() {
        let mut state = state(&["A", "B"]);
        let a = Ticker::new("A");
        let b = Ticker::new("B");

        assert_eq!(finish(&mut state, &a, 70), CommitOutcome::Applied);
        assert_eq!(
            state.commit(&a, EntityMutation::Completed).unwrap(),
            CommitOutcome::AlreadyCompleted
        );
        assert_eq!(state.unfinished(), vec![b.clone()]);

        let CommitOutcome::Finalized(report) = finish(&mut state, &b, 20) else {
            panic!("expected finalized report");
        };
        assert_eq!(report.tickers, vec![a.clone(), b.clone()]);
        assert_eq!(report.evaluation(&a).map(Evaluation::score), Some(70));
        assert_eq!(report.metrics.len(), 2);
        assert_eq!(state.barrier_state(), BarrierState::Finalized);
    }

    #[test]
    fn abandoned_entity_reports_null_evaluation() {
        let mut state = state(&["A"]);
        let a = Ticker::new("A");
        let outcome = state
            .commit(
                &a,
                EntityMutation::Abandoned {
                    reason: "deadline".to_string(),
                },
            )
            .unwrap();
        let CommitOutcome::Finalized(report) = outcome else {
            panic!("expected finalized report");
        };
        assert_eq!(report.evaluations.get(&a), Some(&None));
        assert!(report.metrics[&a].is_empty());
    }

    #[test]
    fn backwards_mutation_is_rejected() {
        let mut state = state(&["A"]);
        let a = Ticker::new("A");
        finish(&mut state, &a, 10);
        let result = state.commit(
            &a,
            EntityMutation::FetchFailed {
                reason: "late".to_string(),
            },
        );
        assert!(matches!(result, Err(WorkflowError::Domain(_))));
    }

    #[test]
    fn skipped_stages_cannot_reach_the_barrier() {
        let mut state = state(&["A"]);
        let a = Ticker::new("A");

        let early = state.commit(
            &a,
            EntityMutation::Evaluated {
                evaluation: Evaluation::new("too soon", 90),
            },
        );
        assert!(matches!(early, Err(WorkflowError::Domain(_))));
        let bare = state.commit(&a, EntityMutation::Completed);
        assert!(matches!(bare, Err(WorkflowError::Domain(_))));

        assert_eq!(state.barrier_state(), BarrierState::Collecting);
        assert_eq!(state.unfinished(), vec![a.clone()]);
        assert!(matches!(finish(&mut state, &a, 40), CommitOutcome::Finalized(_)));
    }

    #[test]
    fn unknown_entity_is_rejected() {
        let mut state = state(&["A"]);
        let result = state.commit(&Ticker::new("Q"), EntityMutation::Completed);
        assert!(matches!(result, Err(WorkflowError::UnknownEntity(_))));
    }
}
