//! Application Use Cases
//!
//! Use cases validate input and drive the workflow engine.

mod screen_ticker;
mod screen_tickers;

pub use screen_ticker::ScreenTickerUseCase;
pub use screen_tickers::{ScreenTickersUseCase, parse_request};
