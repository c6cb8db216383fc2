// src/intent/llm.rs

use serde_json::{Value, json};
use tracing::debug;

use crate::catalog::parse_price;
use crate::intent::ExtractionError;
use crate::llm::CompletionProvider;
use crate::protocol::{Plan, ToolCall};
use crate::tools::{ToolRegistry, ToolSpec};

/// Asks a language model to pick the tool(s) and arguments for a query.
pub struct LlmExtractor {
    provider: Box<dyn CompletionProvider>,
    system_prompt: String,
}

impl LlmExtractor {
    pub fn new(provider: Box<dyn CompletionProvider>, registry: &ToolRegistry) -> Self {
        Self {
            provider,
            system_prompt: system_prompt(&registry.list_all()),
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn extract(&self, query: &str) -> Result<Plan, ExtractionError> {
        debug!(provider = self.provider.name(), "requesting plan from model");
        let raw = self.provider.complete(&self.system_prompt, query)?;
        debug!(raw = %raw, "model output");
        parse_plan(&raw)
    }
}

fn system_prompt(specs: &[ToolSpec]) -> String {
    let tools = specs
        .iter()
        .map(|spec| {
            format!(
                "- **{}**({}): {}",
                spec.name,
                spec.parameter_names.join(", "),
                spec.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are a shopping assistant that routes customer questions to backend tools.

### Available Tools:
{tools}

### Output Format (strict JSON):
{{ "tool": "tool_name", "parameters": {{ "param1": "value1" }}, "reasoning": "Explain why this tool was chosen." }}

If the question needs more than one tool, respond with a JSON array of such objects in the order they must run.

### Constraints:
- Respond with JSON only. Do not add commentary.
- Only use parameter names listed for the chosen tool, and omit parameters the user did not mention.
- For price parameters, always return numeric values without currency symbols.
- Dates must use the YYYY-MM-DD format.
"#
    )
}

/// Pulls a plan out of raw model output. Accepts one `{tool, parameters,
/// reasoning}` object or an array of them; anything else is an error.
pub(crate) fn parse_plan(raw: &str) -> Result<Plan, ExtractionError> {
    let post_think = raw.rsplit("</think>").next().unwrap_or(raw);
    let cleaned = post_think
        .lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n");

    let value = first_plan_value(&cleaned)?;

    let entries = match value {
        Value::Array(items) => items,
        object @ Value::Object(_) => vec![object],
        other => {
            return Err(ExtractionError::Malformed(format!(
                "expected an object or an array, got `{other}`"
            )));
        }
    };

    if entries.is_empty() {
        return Err(ExtractionError::EmptyPlan);
    }

    let steps = entries
        .into_iter()
        .map(|entry| {
            let mut call: ToolCall = serde_json::from_value(entry)
                .map_err(|e| ExtractionError::Malformed(e.to_string()))?;
            normalize_price(&mut call)?;
            Ok(call)
        })
        .collect::<Result<Vec<_>, ExtractionError>>()?;

    Ok(Plan::new(steps))
}

/// First balanced JSON value shaped like a plan: an object, or an array of
/// objects. Bracketed prose such as `[1 step]` is skipped. With no such value,
/// the first value that parsed at all is returned so the caller reports it.
fn first_plan_value(text: &str) -> Result<Value, ExtractionError> {
    let mut fallback = None;
    let mut first_error = None;

    for (start, _) in text.match_indices(['{', '[']) {
        let mut values = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
        match values.next() {
            Some(Ok(value)) if is_plan_shaped(&value) => return Ok(value),
            Some(Ok(value)) => {
                fallback.get_or_insert(value);
            }
            Some(Err(err)) => {
                first_error.get_or_insert_with(|| err.to_string());
            }
            None => {}
        }
    }

    match (fallback, first_error) {
        (Some(value), _) => Ok(value),
        (None, Some(err)) => Err(ExtractionError::Malformed(err)),
        (None, None) => Err(ExtractionError::NoJson),
    }
}

fn is_plan_shaped(value: &Value) -> bool {
    match value {
        Value::Object(_) => true,
        Value::Array(items) => items.iter().all(Value::is_object),
        _ => false,
    }
}

fn normalize_price(call: &mut ToolCall) -> Result<(), ExtractionError> {
    let Some(raw) = call.parameters.get_mut("price") else {
        return Ok(());
    };
    if raw.is_null() {
        return Ok(());
    }

    let shown = raw.as_str().map(str::to_string).unwrap_or_else(|| raw.to_string());
    let amount = parse_price(raw).map_err(|_| ExtractionError::InvalidPrice(shown))?;
    *raw = json!(amount);
    Ok(())
}
