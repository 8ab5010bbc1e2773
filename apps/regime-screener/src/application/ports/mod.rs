//! Application Ports (Driven)
//!
//! Ports define interfaces for the external systems the workflow depends on.

mod financial_data_port;
mod llm_port;

pub use financial_data_port::{DataProviderError, FetchedFinancials, FinancialDataPort};
pub use llm_port::{
    AgentRun, AgentTool, LlmError, LlmPort, ResponseSchema, STATEMENT_TOOLS, StatementAccessor,
    find_tool,
};
