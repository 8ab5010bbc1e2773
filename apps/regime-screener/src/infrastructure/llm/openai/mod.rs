//! OpenAI-compatible LLM adapter.
//!
//! Implements both [`LlmPort`](crate::application::ports::LlmPort) contracts
//! over `POST /chat/completions`: JSON-schema response format for the
//! structured call, function tools plus a bounded loop for the agent.

mod api_types;
mod client;
mod config;
mod retry;

pub use api_types::{ChatMessage, ChatRequest, ChatResponse, FunctionCall, ToolCall};
pub use client::OpenAiClient;
pub use config::{DEFAULT_BASE_URL, DEFAULT_MODEL, OpenAiConfig};
pub use retry::{Backoff, RetryPolicy, is_retryable_status};
