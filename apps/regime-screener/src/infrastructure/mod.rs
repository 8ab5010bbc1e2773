//! Infrastructure Layer
//!
//! Adapters for the ports defined in the application layer:
//!
//! - `market_data/`: financial statement providers (fixture files, in-memory)
//! - `llm/`: OpenAI-compatible chat client and a scripted stand-in
//! - `config/`: dependency injection container

pub mod config;
pub mod llm;
pub mod market_data;
