//! Screening workflow: stage handlers, run state and the engine that
//! schedules them.

mod barrier;
mod engine;
mod error;
mod prompts;
mod shared_state;
mod stage;
pub mod stages;

pub use barrier::{Arrival, Barrier, BarrierState};
pub use engine::{
    DEFAULT_STAGE_CONCURRENCY, EngineSettings, StageTimeouts, WorkflowEngine,
};
pub use error::{StageError, WorkflowError};
pub use prompts::{evaluation_prompt, validation_prompt};
pub use shared_state::{CommitOutcome, SharedState};
pub use stage::{Stage, StageContext, StageOutput};
