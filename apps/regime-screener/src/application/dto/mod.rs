//! Data Transfer Objects (DTOs)
//!
//! DTOs are used for use case inputs and outputs.

mod screening_dto;

pub use screening_dto::{ScreeningReport, ScreeningRequestDto, TickerOutcome};
