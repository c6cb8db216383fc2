// src/error.rs

use thiserror::Error;

use crate::agent::ExecutionError;
use crate::intent::ExtractionError;

/// Everything that can stop a query. Converted into an error-status
/// `QueryResponse` at the pipeline boundary.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Empty query")]
    EmptyQuery,
    #[error("Sorry, I could not understand your request.")]
    UnknownIntent,
    #[error("Could not work out what to do: {0}")]
    Extraction(ExtractionError),
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

impl From<ExtractionError> for AgentError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::UnknownIntent => Self::UnknownIntent,
            other => Self::Extraction(other),
        }
    }
}

impl AgentError {
    /// Short machine-friendly tag, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyQuery => "empty_query",
            Self::UnknownIntent => "unknown_intent",
            Self::Extraction(_) => "extraction",
            Self::Execution(ExecutionError::UnknownTool { .. }) => "unknown_tool",
            Self::Execution(ExecutionError::ToolExecution { .. }) => "tool_execution",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolError;

    #[test]
    fn unknown_intent_is_lifted_out_of_extraction() {
        let err = AgentError::from(ExtractionError::UnknownIntent);
        assert!(matches!(err, AgentError::UnknownIntent));
        assert_eq!(err.kind(), "unknown_intent");

        let err = AgentError::from(ExtractionError::EmptyPlan);
        assert_eq!(err.to_string(), "Could not work out what to do: plan contains no steps");
    }

    #[test]
    fn execution_errors_render_tool_context() {
        let err = AgentError::from(ExecutionError::ToolExecution {
            tool: "get_shipping".into(),
            source: ToolError::MissingParameter("location".into()),
        });
        assert_eq!(err.kind(), "tool_execution");
        assert_eq!(
            err.to_string(),
            "get_shipping failed: missing required parameter `location`"
        );
    }
}
