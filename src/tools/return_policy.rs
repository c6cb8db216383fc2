use serde_json::{Value, json};

use crate::catalog::CatalogStore;
use crate::tools::{Parameters, Tool, ToolError, required_text};

pub struct ReturnPolicyTool;

impl Tool for ReturnPolicyTool {
    fn name(&self) -> &'static str {
        "get_return_policy"
    }

    fn description(&self) -> &'static str {
        "Looks up the return policy of a store."
    }

    fn parameters(&self) -> &'static [&'static str] {
        &["store_name"]
    }

    fn required(&self) -> &'static [&'static str] {
        &["store_name"]
    }

    fn execute(&self, catalog: &CatalogStore, params: &Parameters) -> Result<Value, ToolError> {
        let store = required_text(params, "store_name")?;
        Ok(json!(catalog.return_policy(&store)))
    }
}
