// src/agent/executor.rs

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::CatalogStore;
use crate::protocol::{Plan, StepResult, ToolCall};
use crate::tools::{ToolError, ToolRegistry};
use crate::validation::{PlanValidationError, validate_plan};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecutionError {
    #[error("unknown tool `{tool}`")]
    UnknownTool { tool: String },
    #[error("{tool} failed: {source}")]
    ToolExecution {
        tool: String,
        #[source]
        source: ToolError,
    },
}

/// What happens when a step fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FailureMode {
    /// The first failing step aborts the plan.
    #[default]
    FailFast,
    /// Failing steps are recorded and the remaining steps still run.
    Partial,
}

/// Runs a plan step by step against the catalog.
pub struct PlanExecutor<'a> {
    registry: &'a ToolRegistry,
    catalog: &'a CatalogStore,
    mode: FailureMode,
}

impl<'a> PlanExecutor<'a> {
    pub fn new(registry: &'a ToolRegistry, catalog: &'a CatalogStore, mode: FailureMode) -> Self {
        Self {
            registry,
            catalog,
            mode,
        }
    }

    /// Results come back in plan order. The plan is validated up front, so an
    /// unknown tool aborts before any step touches the catalog.
    pub fn execute(&self, plan: &Plan) -> Result<Vec<StepResult>, ExecutionError> {
        let problems = validate_plan(plan, self.registry);

        if let Some(unknown) = problems
            .iter()
            .find(|p| matches!(p, PlanValidationError::UnknownTool { .. }))
        {
            return Err(ExecutionError::UnknownTool {
                tool: unknown.tool().to_string(),
            });
        }

        if self.mode == FailureMode::FailFast {
            if let Some(first) = problems.first() {
                return Err(step_error(first));
            }
        }

        let mut results = Vec::with_capacity(plan.len());

        for (index, call) in plan.iter().enumerate() {
            let outcome = match problems.iter().find(|p| p.step() == index) {
                Some(problem) => Err(step_error(problem)),
                None => self.run_step(index, call),
            };

            match outcome {
                Ok(result) => results.push(result),
                Err(err) if self.mode == FailureMode::Partial => {
                    warn!(step = index, tool = %call.tool, error = %err, "step failed, continuing");
                    let detail = match &err {
                        ExecutionError::ToolExecution { source, .. } => source.to_string(),
                        other => other.to_string(),
                    };
                    results.push(StepResult::failed(call, detail));
                }
                Err(err) => return Err(err),
            }
        }

        Ok(results)
    }

    fn run_step(&self, index: usize, call: &ToolCall) -> Result<StepResult, ExecutionError> {
        let tool = self
            .registry
            .lookup(&call.tool)
            .map_err(|_| ExecutionError::UnknownTool {
                tool: call.tool.clone(),
            })?;

        info!(step = index, tool = %call.tool, "running step");
        let value = tool
            .execute(self.catalog, &call.parameters)
            .map_err(|source| ExecutionError::ToolExecution {
                tool: call.tool.clone(),
                source,
            })?;

        Ok(StepResult::completed(call, value))
    }
}

fn step_error(problem: &PlanValidationError) -> ExecutionError {
    match problem.as_tool_error() {
        Some(source) => ExecutionError::ToolExecution {
            tool: problem.tool().to_string(),
            source,
        },
        None => ExecutionError::UnknownTool {
            tool: problem.tool().to_string(),
        },
    }
}
