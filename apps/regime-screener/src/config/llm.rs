//! Language model configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::infrastructure::llm::RetryPolicy;
use crate::infrastructure::llm::openai::{DEFAULT_BASE_URL, DEFAULT_MODEL, OpenAiConfig};

/// Which language model adapter to wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProviderKind {
    /// OpenAI-compatible chat-completions endpoint.
    #[default]
    Openai,
    /// Canned responses, no network.
    Scripted,
}

/// Language model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Adapter to use.
    #[serde(default)]
    pub provider: LlmProviderKind,
    /// API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// API key.
    #[serde(default)]
    pub api_key: String,
    /// Model for the evaluation call.
    #[serde(default = "default_model")]
    pub evaluation_model: String,
    /// Model for the validation agent.
    #[serde(default = "default_model")]
    pub agent_model: String,
    /// Sampling temperature.
    #[serde(default)]
    pub temperature: f32,
    /// Per-request HTTP timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Maximum model turns in one agent run.
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: u32,
    /// Retry settings for transient failures.
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProviderKind::default(),
            base_url: default_base_url(),
            api_key: String::new(),
            evaluation_model: default_model(),
            agent_model: default_model(),
            temperature: 0.0,
            request_timeout_secs: default_request_timeout_secs(),
            max_tool_rounds: default_max_tool_rounds(),
            retry: RetryConfig::default(),
        }
    }
}

impl LlmConfig {
    /// Client configuration for the OpenAI adapter.
    #[must_use]
    pub fn openai(&self) -> OpenAiConfig {
        OpenAiConfig {
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            evaluation_model: self.evaluation_model.clone(),
            agent_model: self.agent_model.clone(),
            temperature: self.temperature,
            timeout: Duration::from_secs(self.request_timeout_secs),
            max_tool_rounds: self.max_tool_rounds,
            retry: self.retry.policy(),
        }
    }
}

/// Retry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Attempts including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// First backoff in milliseconds.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Backoff cap in milliseconds.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Exponential growth factor.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    /// Jitter as a fraction of the backoff.
    #[serde(default = "default_jitter_factor")]
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter_factor: default_jitter_factor(),
        }
    }
}

impl RetryConfig {
    /// Convert into the client's retry policy.
    #[must_use]
    pub const fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
            backoff_multiplier: self.backoff_multiplier,
            jitter_factor: self.jitter_factor,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

const fn default_request_timeout_secs() -> u64 {
    180
}

const fn default_max_tool_rounds() -> u32 {
    8
}

const fn default_max_attempts() -> u32 {
    3
}

const fn default_initial_backoff_ms() -> u64 {
    500
}

const fn default_max_backoff_ms() -> u64 {
    20_000
}

const fn default_backoff_multiplier() -> f64 {
    2.0
}

const fn default_jitter_factor() -> f64 {
    0.2
}
