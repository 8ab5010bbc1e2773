//! Deterministic in-process LLM for tests and offline runs.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::application::ports::{
    AgentRun, AgentTool, LlmError, LlmPort, ResponseSchema, StatementAccessor,
};

/// Scripted LLM.
///
/// The structured call returns a fixed `{explanation, score}` (or a scripted
/// response/error); the agent reads the first few statements through the
/// accessor and returns fixed commentary. Clones share call counters.
#[derive(Debug, Clone)]
pub struct ScriptedLlm {
    score: i64,
    commentary: String,
    structured_response: Option<Value>,
    structured_error: Option<LlmError>,
    agent_error: Option<LlmError>,
    tools_per_run: usize,
    delay: Duration,
    structured_calls: Arc<AtomicUsize>,
    agent_calls: Arc<AtomicUsize>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl Default for ScriptedLlm {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedLlm {
    /// Scripted LLM scoring 50 and calling one tool per agent run.
    #[must_use]
    pub fn new() -> Self {
        Self {
            score: 50,
            commentary: "Metrics reconcile with the reported statements.".to_string(),
            structured_response: None,
            structured_error: None,
            agent_error: None,
            tools_per_run: 1,
            delay: Duration::ZERO,
            structured_calls: Arc::new(AtomicUsize::new(0)),
            agent_calls: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Score returned by the structured call.
    #[must_use]
    pub const fn with_score(mut self, score: i64) -> Self {
        self.score = score;
        self
    }

    /// Commentary returned by the agent.
    #[must_use]
    pub fn with_commentary(mut self, commentary: impl Into<String>) -> Self {
        self.commentary = commentary.into();
        self
    }

    /// Raw value returned by the structured call instead of the default shape.
    #[must_use]
    pub fn with_structured_response(mut self, response: Value) -> Self {
        self.structured_response = Some(response);
        self
    }

    /// Make every structured call fail.
    #[must_use]
    pub fn failing_structured(mut self, error: LlmError) -> Self {
        self.structured_error = Some(error);
        self
    }

    /// Make every agent run fail.
    #[must_use]
    pub fn failing_agent(mut self, error: LlmError) -> Self {
        self.agent_error = Some(error);
        self
    }

    /// Number of tools each agent run calls.
    #[must_use]
    pub const fn with_tools_per_run(mut self, count: usize) -> Self {
        self.tools_per_run = count;
        self
    }

    /// Sleep before answering.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Structured calls made so far.
    #[must_use]
    pub fn structured_calls(&self) -> usize {
        self.structured_calls.load(Ordering::SeqCst)
    }

    /// Agent runs made so far.
    #[must_use]
    pub fn agent_calls(&self) -> usize {
        self.agent_calls.load(Ordering::SeqCst)
    }

    /// Every prompt received, in arrival order.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[async_trait]
impl LlmPort for ScriptedLlm {
    async fn complete_structured(
        &self,
        prompt: &str,
        _schema: &ResponseSchema,
    ) -> Result<Value, LlmError> {
        self.structured_calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(prompt.to_string());
        self.pause().await;

        if let Some(error) = &self.structured_error {
            return Err(error.clone());
        }
        Ok(self.structured_response.clone().unwrap_or_else(|| {
            json!({
                "explanation": "Scripted evaluation against the regime criteria.",
                "score": self.score,
            })
        }))
    }

    async fn run_agent(
        &self,
        prompt: &str,
        tools: &[AgentTool],
        accessor: &dyn StatementAccessor,
    ) -> Result<AgentRun, LlmError> {
        self.agent_calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(prompt.to_string());
        self.pause().await;

        if let Some(error) = &self.agent_error {
            return Err(error.clone());
        }
        let mut tool_calls = Vec::new();
        for tool in tools.iter().take(self.tools_per_run) {
            let _ = accessor.render(tool.statement);
            tool_calls.push(tool.name.to_string());
        }
        Ok(AgentRun {
            text: self.commentary.clone(),
            tool_calls,
        })
    }
}
