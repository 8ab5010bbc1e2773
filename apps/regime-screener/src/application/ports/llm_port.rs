//! Language Model Port (Driven Port)
//!
//! Two contracts: a structured completion that must return JSON of a given
//! shape, and a tool-using agent that may read the raw statements through an
//! explicit accessor.

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::domain::screening::StatementKind;

/// JSON shape a structured completion must satisfy.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSchema {
    /// Schema name sent to the provider.
    pub name: &'static str,
    /// JSON Schema document.
    pub schema: Value,
}

impl ResponseSchema {
    /// `{explanation: string, score: integer 0..=100}`.
    #[must_use]
    pub fn evaluation() -> Self {
        Self {
            name: "regime_evaluation",
            schema: json!({
                "type": "object",
                "properties": {
                    "explanation": { "type": "string" },
                    "score": { "type": "integer", "minimum": 0, "maximum": 100 }
                },
                "required": ["explanation", "score"],
                "additionalProperties": false
            }),
        }
    }
}

/// A zero-argument tool exposed to the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentTool {
    /// Function name the model calls.
    pub name: &'static str,
    /// Description shown to the model.
    pub description: &'static str,
    /// Statement the tool returns.
    pub statement: StatementKind,
}

/// The four raw-statement accessors.
pub const STATEMENT_TOOLS: [AgentTool; 4] = [
    AgentTool {
        name: "get_annual_income_data",
        description: "Get annual income statement data",
        statement: StatementKind::AnnualIncome,
    },
    AgentTool {
        name: "get_quarterly_income_data",
        description: "Get quarterly income statement data",
        statement: StatementKind::QuarterlyIncome,
    },
    AgentTool {
        name: "get_annual_balance_data",
        description: "Get annual balance sheet data",
        statement: StatementKind::AnnualBalanceSheet,
    },
    AgentTool {
        name: "get_quarterly_balance_data",
        description: "Get quarterly balance sheet data",
        statement: StatementKind::QuarterlyBalanceSheet,
    },
];

/// Look up a tool by the name the model used.
#[must_use]
pub fn find_tool<'a>(tools: &'a [AgentTool], name: &str) -> Option<&'a AgentTool> {
    tools.iter().find(|t| t.name == name)
}

/// Read access to one entity's raw statements.
pub trait StatementAccessor: Send + Sync {
    /// Render a statement for the model.
    fn render(&self, kind: StatementKind) -> String;
}

/// Result of an agent run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentRun {
    /// Final answer.
    pub text: String,
    /// Names of the tools invoked, in call order.
    pub tool_calls: Vec<String>,
}

/// LLM error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LlmError {
    /// The request did not finish in time.
    #[error("LLM request timed out after {seconds}s")]
    Timeout {
        /// Timeout that elapsed.
        seconds: u64,
    },

    /// Provider rate limit.
    #[error("LLM rate limited")]
    RateLimited,

    /// Non-success HTTP status.
    #[error("LLM API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error body.
        message: String,
    },

    /// Transport failure.
    #[error("LLM network error: {0}")]
    Network(String),

    /// Output did not match the requested shape.
    #[error("Malformed LLM output: {0}")]
    Malformed(String),

    /// The agent kept calling tools past the round limit.
    #[error("Agent exceeded {rounds} tool rounds without answering")]
    ToolLoopExceeded {
        /// Round limit.
        rounds: u32,
    },

    /// Client misconfigured (e.g. missing API key).
    #[error("LLM configuration error: {0}")]
    Configuration(String),
}

impl LlmError {
    /// Returns true if the request may succeed when retried.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::RateLimited | Self::Network(_) => true,
            Self::Api { status, .. } => *status >= 500,
            Self::Malformed(_) | Self::ToolLoopExceeded { .. } | Self::Configuration(_) => false,
        }
    }
}

/// Port for language model calls.
#[async_trait]
pub trait LlmPort: Send + Sync {
    /// Structured completion returning JSON that matches `schema`.
    async fn complete_structured(
        &self,
        prompt: &str,
        schema: &ResponseSchema,
    ) -> Result<Value, LlmError>;

    /// Tool-using agent run. Tool calls are answered through `accessor`.
    async fn run_agent(
        &self,
        prompt: &str,
        tools: &[AgentTool],
        accessor: &dyn StatementAccessor,
    ) -> Result<AgentRun, LlmError>;
}
