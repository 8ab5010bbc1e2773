//! Financial data adapters.
//!
//! - `FixtureDataProvider`: one JSON document per ticker on disk
//! - `InMemoryDataProvider`: seeded map, used by tests and the demo config

mod document;
mod fixture;
mod in_memory;

pub use document::FinancialsDocument;
pub use fixture::FixtureDataProvider;
pub use in_memory::{InMemoryDataProvider, samples};
