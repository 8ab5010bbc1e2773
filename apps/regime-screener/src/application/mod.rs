//! Application Layer
//!
//! The application layer orchestrates domain logic through use cases.
//! It defines:
//!
//! - **Ports**: Interfaces for the data provider and the language model
//! - **Workflow**: Stage handlers and the engine that schedules them
//! - **Use Cases**: Single- and multi-ticker screening
//! - **DTOs**: Requests and reports

pub mod dto;
pub mod ports;
pub mod use_cases;
pub mod workflow;

pub use dto::*;
pub use ports::*;
pub use use_cases::*;
