//! Domain Layer
//!
//! The innermost layer containing business logic with zero infrastructure dependencies.
//! This layer defines:
//!
//! - **Aggregates**: Consistency boundaries with invariants
//! - **Value Objects**: Immutable domain types with equality by value
//! - **Domain Events**: Records of stage transitions
//! - **Domain Services**: Stateless business logic
//!
//! # Bounded Contexts
//!
//! - [`screening`]: Regime screening of tickers (metrics, routing, criteria)

pub mod screening;
pub mod shared;
