//! OpenAI-compatible client configuration.

use std::time::Duration;

use super::retry::RetryPolicy;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model for both calls.
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Client configuration.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Bearer token.
    pub api_key: String,
    /// API base URL, without the `/chat/completions` suffix.
    pub base_url: String,
    /// Model for structured evaluation calls.
    pub evaluation_model: String,
    /// Model for the validation agent.
    pub agent_model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
    /// Maximum model turns in one agent run.
    pub max_tool_rounds: u32,
    /// Retry policy for transient failures.
    pub retry: RetryPolicy,
}

impl OpenAiConfig {
    /// Create a configuration with defaults for everything but the key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            evaluation_model: DEFAULT_MODEL.to_string(),
            agent_model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            timeout: Duration::from_secs(180),
            max_tool_rounds: 8,
            retry: RetryPolicy::default(),
        }
    }

    /// Set the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the tool round limit.
    #[must_use]
    pub const fn with_max_tool_rounds(mut self, rounds: u32) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    /// Chat-completions endpoint.
    #[must_use]
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completions_url_tolerates_trailing_slash() {
        let config = OpenAiConfig::new("k").with_base_url("http://localhost:8080/v1/");
        assert_eq!(config.completions_url(), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn defaults() {
        let config = OpenAiConfig::new("k");
        assert_eq!(config.evaluation_model, DEFAULT_MODEL);
        assert_eq!(config.max_tool_rounds, 8);
        assert_eq!(config.retry.max_attempts, 3);
    }
}
