// src/validation/plan.rs

use crate::protocol::Plan;
use crate::tools::{ToolError, ToolRegistry};

/// A problem found in one step of a plan before anything runs.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanValidationError {
    UnknownTool { step: usize, tool: String },
    MissingParameter { step: usize, tool: String, parameter: String },
    UnexpectedParameter { step: usize, tool: String, parameter: String },
}

impl PlanValidationError {
    pub fn step(&self) -> usize {
        match self {
            Self::UnknownTool { step, .. }
            | Self::MissingParameter { step, .. }
            | Self::UnexpectedParameter { step, .. } => *step,
        }
    }

    pub fn tool(&self) -> &str {
        match self {
            Self::UnknownTool { tool, .. }
            | Self::MissingParameter { tool, .. }
            | Self::UnexpectedParameter { tool, .. } => tool,
        }
    }

    /// The tool-level error this problem would produce if the step ran.
    /// `None` for unknown tools, which never reach a tool.
    pub fn as_tool_error(&self) -> Option<ToolError> {
        match self {
            Self::UnknownTool { .. } => None,
            Self::MissingParameter { parameter, .. } => {
                Some(ToolError::MissingParameter(parameter.clone()))
            }
            Self::UnexpectedParameter { parameter, .. } => {
                Some(ToolError::UnexpectedParameter(parameter.clone()))
            }
        }
    }
}

/// Checks every step against the registry: the tool must exist, required
/// parameters must be present and non-null, and no undeclared parameter may appear.
pub fn validate_plan(plan: &Plan, registry: &ToolRegistry) -> Vec<PlanValidationError> {
    let mut errors = Vec::new();

    for (step, call) in plan.iter().enumerate() {
        let spec = match registry.lookup(&call.tool) {
            Ok(tool) => tool.spec(),
            Err(_) => {
                errors.push(PlanValidationError::UnknownTool {
                    step,
                    tool: call.tool.clone(),
                });
                continue;
            }
        };

        for required in &spec.required {
            let present = call
                .parameters
                .get(required)
                .is_some_and(|v| !v.is_null());
            if !present {
                errors.push(PlanValidationError::MissingParameter {
                    step,
                    tool: call.tool.clone(),
                    parameter: required.clone(),
                });
            }
        }

        for name in call.parameters.keys() {
            if !spec.accepts(name) {
                errors.push(PlanValidationError::UnexpectedParameter {
                    step,
                    tool: call.tool.clone(),
                    parameter: name.clone(),
                });
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ToolCall;
    use pretty_assertions::assert_eq;

    #[test]
    fn valid_plan_has_no_errors() {
        let plan = Plan::new(vec![
            ToolCall::new("compare_prices").param("product_name", "Denim Jacket"),
            ToolCall::new("check_discount")
                .param("promo_code", "SAVE10")
                .param("price", 72.0),
        ]);
        assert!(validate_plan(&plan, &ToolRegistry::shopping()).is_empty());
    }

    #[test]
    fn reports_each_problem_with_its_step() {
        let plan = Plan::new(vec![
            ToolCall::new("search_products").param("colour", "red"),
            ToolCall::new("teleport"),
            ToolCall::new("get_return_policy").param("store_name", serde_json::Value::Null),
        ]);

        let errors = validate_plan(&plan, &ToolRegistry::shopping());
        assert_eq!(
            errors,
            vec![
                PlanValidationError::UnexpectedParameter {
                    step: 0,
                    tool: "search_products".into(),
                    parameter: "colour".into(),
                },
                PlanValidationError::UnknownTool {
                    step: 1,
                    tool: "teleport".into(),
                },
                PlanValidationError::MissingParameter {
                    step: 2,
                    tool: "get_return_policy".into(),
                    parameter: "store_name".into(),
                },
            ]
        );
        assert_eq!(errors[1].as_tool_error(), None);
        assert_eq!(errors[2].step(), 2);
    }
}
