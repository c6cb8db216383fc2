//! Natural-language shopping assistant.
//!
//! A query is turned into a plan of tool calls by one of three intent
//! extractors, the plan runs in order against a static catalog, and the
//! results are composed into a structured response with a short summary.

pub mod agent;
pub mod catalog;
pub mod config;
pub mod error;
pub mod intent;
pub mod llm;
pub mod protocol;
pub mod tools;
pub mod validation;

pub use agent::ShoppingAgent;
pub use error::AgentError;
pub use protocol::{Plan, QueryResponse, Status, StepResult, ToolCall};
