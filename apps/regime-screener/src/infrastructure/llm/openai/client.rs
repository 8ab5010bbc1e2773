//! OpenAI-compatible chat-completions adapter.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::{Duration, Instant};

use super::api_types::{
    ApiErrorResponse, ChatMessage, ChatRequest, ChatResponse, json_schema_format, tool_definition,
};
use super::config::OpenAiConfig;
use super::retry::{Backoff, is_retryable_status};
use crate::application::ports::{
    AgentRun, AgentTool, LlmError, LlmPort, ResponseSchema, StatementAccessor, find_tool,
};
use crate::observability::{record_llm_request, record_llm_retry};

const AGENT_SYSTEM_PROMPT: &str = "You are a meticulous financial data analyst. Use the provided \
     tools to read a company's raw statements before commenting on its metrics.";

/// LLM adapter for any OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Configuration` if the API key is empty or the HTTP
    /// client cannot be built.
    pub fn new(config: OpenAiConfig) -> Result<Self, LlmError> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::Configuration("API key is empty".to_string()));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Configuration(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// Send one chat request, retrying transient failures.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatMessage, LlmError> {
        let url = self.config.completions_url();
        let mut backoff = Backoff::new(&self.config.retry);

        loop {
            let response = match self
                .client
                .post(&url)
                .bearer_auth(&self.config.api_key)
                .json(request)
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(e) => {
                    let error = if e.is_timeout() {
                        LlmError::Timeout {
                            seconds: self.config.timeout.as_secs(),
                        }
                    } else {
                        LlmError::Network(e.to_string())
                    };
                    if let Some(delay) = backoff.next_backoff() {
                        tracing::warn!(
                            error = %error,
                            delay_ms = delay.as_millis(),
                            attempt = backoff.attempt(),
                            "LLM request failed, retrying"
                        );
                        record_llm_retry("network");
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(error);
                }
            };

            let status = response.status();
            if status.is_success() {
                let body: ChatResponse = response
                    .json()
                    .await
                    .map_err(|e| LlmError::Malformed(e.to_string()))?;
                return body
                    .choices
                    .into_iter()
                    .next()
                    .map(|choice| choice.message)
                    .ok_or_else(|| LlmError::Malformed("response has no choices".to_string()));
            }

            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map_or(body, |err| err.error.message);

            if is_retryable_status(status.as_u16()) {
                if let Some(delay) = backoff.next_backoff() {
                    let delay = retry_after
                        .map_or(delay, Duration::from_secs)
                        .min(self.config.retry.max_backoff);
                    tracing::warn!(
                        status = status.as_u16(),
                        message = %message,
                        delay_ms = delay.as_millis(),
                        "Retryable LLM API error, retrying"
                    );
                    record_llm_retry(if status == StatusCode::TOO_MANY_REQUESTS {
                        "rate_limited"
                    } else {
                        "server_error"
                    });
                    tokio::time::sleep(delay).await;
                    continue;
                }
            }

            return Err(if status == StatusCode::TOO_MANY_REQUESTS {
                LlmError::RateLimited
            } else {
                LlmError::Api {
                    status: status.as_u16(),
                    message,
                }
            });
        }
    }

    async fn agent_loop(
        &self,
        prompt: &str,
        tools: &[AgentTool],
        accessor: &dyn StatementAccessor,
    ) -> Result<AgentRun, LlmError> {
        let mut messages = vec![ChatMessage::system(AGENT_SYSTEM_PROMPT), ChatMessage::user(prompt)];
        let definitions: Vec<Value> = tools.iter().map(tool_definition).collect();
        let mut calls = Vec::new();

        for _ in 0..self.config.max_tool_rounds {
            let request = ChatRequest {
                model: self.config.agent_model.clone(),
                messages: messages.clone(),
                temperature: self.config.temperature,
                response_format: None,
                tools: definitions.clone(),
            };
            let reply = self.chat(&request).await?;

            if reply.tool_calls.is_empty() {
                return Ok(AgentRun {
                    text: reply.content.unwrap_or_default(),
                    tool_calls: calls,
                });
            }

            let requested = reply.tool_calls.clone();
            messages.push(reply);
            for call in requested {
                let output = match find_tool(tools, &call.function.name) {
                    Some(tool) => accessor.render(tool.statement),
                    None => format!("Unknown tool '{}'.", call.function.name),
                };
                tracing::debug!(tool = %call.function.name, "Agent tool call");
                calls.push(call.function.name.clone());
                messages.push(ChatMessage::tool(call.id, output));
            }
        }

        Err(LlmError::ToolLoopExceeded {
            rounds: self.config.max_tool_rounds,
        })
    }
}

const fn status_label<T>(result: &Result<T, LlmError>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(LlmError::Timeout { .. }) => "timeout",
        Err(LlmError::RateLimited) => "rate_limited",
        Err(LlmError::Api { .. }) => "api_error",
        Err(LlmError::Network(_)) => "network",
        Err(LlmError::Malformed(_)) => "malformed",
        Err(LlmError::ToolLoopExceeded { .. }) => "tool_loop",
        Err(LlmError::Configuration(_)) => "configuration",
    }
}

#[async_trait]
impl LlmPort for OpenAiClient {
    async fn complete_structured(
        &self,
        prompt: &str,
        schema: &ResponseSchema,
    ) -> Result<Value, LlmError> {
        let started = Instant::now();
        let request = ChatRequest {
            model: self.config.evaluation_model.clone(),
            messages: vec![ChatMessage::user(prompt)],
            temperature: self.config.temperature,
            response_format: Some(json_schema_format(schema)),
            tools: Vec::new(),
        };

        let result = self.chat(&request).await.and_then(|reply| {
            let content = reply
                .content
                .ok_or_else(|| LlmError::Malformed("empty completion".to_string()))?;
            serde_json::from_str::<Value>(&content).map_err(|e| LlmError::Malformed(e.to_string()))
        });

        record_llm_request("structured", status_label(&result), started.elapsed().as_secs_f64());
        result
    }

    async fn run_agent(
        &self,
        prompt: &str,
        tools: &[AgentTool],
        accessor: &dyn StatementAccessor,
    ) -> Result<AgentRun, LlmError> {
        let started = Instant::now();
        let result = self.agent_loop(prompt, tools, accessor).await;
        record_llm_request("agent", status_label(&result), started.elapsed().as_secs_f64());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_api_key_is_rejected() {
        let result = OpenAiClient::new(OpenAiConfig::new("  "));
        assert!(matches!(result, Err(LlmError::Configuration(_))));
    }

    #[test]
    fn status_labels() {
        assert_eq!(status_label(&Ok::<(), LlmError>(())), "ok");
        assert_eq!(status_label::<()>(&Err(LlmError::RateLimited)), "rate_limited");
    }
}
