//! Fan-in barrier over a fixed set of tickers.

use std::collections::HashSet;

use super::error::WorkflowError;
use crate::domain::shared::Ticker;

/// Barrier lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarrierState {
    /// Waiting for entities.
    Collecting,
    /// Every entity arrived; the report has been produced.
    Finalized,
}

/// Result of one arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrival {
    /// Counted; others still pending.
    Counted {
        /// Entities done so far.
        done: usize,
        /// Entities in the run.
        total: usize,
    },
    /// This ticker had already arrived.
    Duplicate,
    /// Last ticker arrived; the barrier just finalized.
    Released,
}

/// Counts distinct arrivals and releases exactly once.
#[derive(Debug, Clone)]
pub struct Barrier {
    expected: HashSet<Ticker>,
    completed: HashSet<Ticker>,
    state: BarrierState,
}

impl Barrier {
    /// Barrier over `expected`.
    #[must_use]
    pub fn new(expected: impl IntoIterator<Item = Ticker>) -> Self {
        Self {
            expected: expected.into_iter().collect(),
            completed: HashSet::new(),
            state: BarrierState::Collecting,
        }
    }

    /// Record that `ticker` is done.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::UnknownEntity` for tickers outside the run.
    pub fn arrive(&mut self, ticker: &Ticker) -> Result<Arrival, WorkflowError> {
        if !self.expected.contains(ticker) {
            return Err(WorkflowError::UnknownEntity(ticker.to_string()));
        }
        if self.state == BarrierState::Finalized || !self.completed.insert(ticker.clone()) {
            return Ok(Arrival::Duplicate);
        }
        if self.completed.len() == self.expected.len() {
            self.state = BarrierState::Finalized;
            return Ok(Arrival::Released);
        }
        Ok(Arrival::Counted {
            done: self.completed.len(),
            total: self.expected.len(),
        })
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> BarrierState {
        self.state
    }

    /// Whether `ticker` has arrived.
    #[must_use]
    pub fn is_completed(&self, ticker: &Ticker) -> bool {
        self.completed.contains(ticker)
    }

    /// Entities done so far.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.len()
    }
}
