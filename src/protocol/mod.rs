// src/protocol/mod.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tools::Parameters;

/// One planned tool invocation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolCall {
    pub tool: String,
    #[serde(default)]
    pub parameters: Parameters,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl ToolCall {
    pub fn new(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            parameters: Parameters::new(),
            reasoning: None,
        }
    }

    pub fn param(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.to_string(), value.into());
        self
    }

    pub fn reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }
}

/// Ordered steps to run. Steps do not feed each other; any value a later
/// step needs was decided when the plan was built.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Plan {
    pub steps: Vec<ToolCall>,
}

impl Plan {
    pub fn new(steps: Vec<ToolCall>) -> Self {
        Self { steps }
    }

    pub fn single(call: ToolCall) -> Self {
        Self { steps: vec![call] }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ToolCall> {
        self.steps.iter()
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.tool.as_str()).collect()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StepResult {
    pub tool: String,
    pub parameters: Parameters,
    pub result: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    /// Only set when the executor runs in partial-results mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepResult {
    pub fn completed(call: &ToolCall, result: Value) -> Self {
        Self {
            tool: call.tool.clone(),
            parameters: call.parameters.clone(),
            result,
            reasoning: call.reasoning.clone(),
            error: None,
        }
    }

    pub fn failed(call: &ToolCall, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::completed(call, Value::Null)
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QueryResponse {
    pub status: Status,
    pub query: String,
    pub steps: Vec<StepResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub natural_response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl QueryResponse {
    pub fn success(query: &str, steps: Vec<StepResult>, natural_response: Option<String>) -> Self {
        Self {
            status: Status::Success,
            query: query.to_string(),
            steps,
            natural_response,
            message: None,
        }
    }

    pub fn error(query: &str, message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            query: query.to_string(),
            steps: Vec::new(),
            natural_response: None,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tool_call_parses_strictly() {
        let call: ToolCall = serde_json::from_value(json!({
            "tool": "compare_prices",
            "parameters": { "product_name": "Denim Jacket" },
            "reasoning": "price comparison"
        }))
        .unwrap();
        assert_eq!(
            call,
            ToolCall::new("compare_prices")
                .param("product_name", "Denim Jacket")
                .reasoning("price comparison")
        );

        let extra = serde_json::from_value::<ToolCall>(json!({ "tool": "x", "confidence": 1 }));
        assert!(extra.is_err());
    }

    #[test]
    fn error_response_serializes_without_summary() {
        let response = QueryResponse::error("", "Empty query");
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "status": "error", "query": "", "steps": [], "message": "Empty query" })
        );
    }

    #[test]
    fn failed_step_keeps_call_details() {
        let call = ToolCall::new("get_shipping").param("location", "Paris");
        let step = StepResult::failed(&call, "boom");
        assert!(step.is_failed());
        assert_eq!(step.result, Value::Null);
        assert_eq!(step.parameters["location"], "Paris");
    }
}
