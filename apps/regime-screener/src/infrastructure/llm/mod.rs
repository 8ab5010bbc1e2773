//! LLM adapters.

pub mod openai;
mod scripted;

pub use openai::{OpenAiClient, OpenAiConfig, RetryPolicy};
pub use scripted::ScriptedLlm;
