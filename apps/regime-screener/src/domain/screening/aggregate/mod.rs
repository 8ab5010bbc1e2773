//! Screening aggregates.

mod entity_state;

pub use entity_state::{EntityMutation, EntityState};
