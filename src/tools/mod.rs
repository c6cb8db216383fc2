// src/tools/mod.rs

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::catalog::{CatalogError, CatalogStore, parse_price};

pub mod compare_prices;
pub mod discount;
pub mod return_policy;
pub mod search_products;
pub mod shipping;

pub use compare_prices::ComparePricesTool;
pub use discount::DiscountTool;
pub use return_policy::ReturnPolicyTool;
pub use search_products::SearchProductsTool;
pub use shipping::ShippingTool;

/// Arguments of a single tool call, keyed by parameter name.
pub type Parameters = Map<String, Value>;

/// Static declaration of an invocable operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub parameter_names: Vec<String>,
    pub required: Vec<String>,
    pub description: String,
}

impl ToolSpec {
    pub fn accepts(&self, parameter: &str) -> bool {
        self.parameter_names.iter().any(|p| p == parameter)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ToolError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("missing required parameter `{0}`")]
    MissingParameter(String),
    #[error("parameter `{name}` must be {expected}")]
    InvalidParameter { name: String, expected: &'static str },
    #[error("unexpected parameter `{0}`")]
    UnexpectedParameter(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("unknown tool `{0}`")]
    UnknownTool(String),
    #[error("tool `{0}` is already registered")]
    Duplicate(String),
}

/// A shopping operation backed by the catalog.
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn parameters(&self) -> &'static [&'static str];

    fn required(&self) -> &'static [&'static str] {
        &[]
    }

    fn execute(&self, catalog: &CatalogStore, params: &Parameters) -> Result<Value, ToolError>;

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().into(),
            parameter_names: self.parameters().iter().map(|p| p.to_string()).collect(),
            required: self.required().iter().map(|p| p.to_string()).collect(),
            description: self.description().into(),
        }
    }
}

/// Name → tool map. Built at startup and never mutated once handed to an agent.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the five catalog tools.
    pub fn shopping() -> Self {
        let mut registry = Self::new();
        registry.insert(Box::new(SearchProductsTool));
        registry.insert(Box::new(ComparePricesTool));
        registry.insert(Box::new(ShippingTool));
        registry.insert(Box::new(DiscountTool));
        registry.insert(Box::new(ReturnPolicyTool));
        registry
    }

    pub fn register<T: Tool + 'static>(&mut self, tool: T) -> Result<(), RegistryError> {
        if self.tools.contains_key(tool.name()) {
            return Err(RegistryError::Duplicate(tool.name().into()));
        }
        self.insert(Box::new(tool));
        Ok(())
    }

    fn insert(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_none() {
            self.order.push(name);
        }
    }

    pub fn lookup(&self, name: &str) -> Result<&dyn Tool, RegistryError> {
        self.tools
            .get(name)
            .map(|boxed| boxed.as_ref())
            .ok_or_else(|| RegistryError::UnknownTool(name.to_string()))
    }

    /// Specs in registration order.
    pub fn list_all(&self) -> Vec<ToolSpec> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| tool.spec())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

// Parameter accessors shared by the tools. `null` and blank strings count as absent.

pub(crate) fn optional_text(params: &Parameters, name: &str) -> Result<Option<String>, ToolError> {
    match params.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(_) => Err(ToolError::InvalidParameter {
            name: name.into(),
            expected: "a string",
        }),
    }
}

pub(crate) fn required_text(params: &Parameters, name: &str) -> Result<String, ToolError> {
    optional_text(params, name)?.ok_or_else(|| ToolError::MissingParameter(name.into()))
}

pub(crate) fn optional_price(params: &Parameters, name: &str) -> Result<Option<f64>, ToolError> {
    match params.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => Ok(Some(parse_price(value)?)),
    }
}

pub(crate) fn required_price(params: &Parameters, name: &str) -> Result<f64, ToolError> {
    optional_price(params, name)?.ok_or_else(|| ToolError::MissingParameter(name.into()))
}
