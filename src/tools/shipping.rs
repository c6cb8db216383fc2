use serde_json::{Value, json};

use crate::catalog::CatalogStore;
use crate::tools::{Parameters, Tool, ToolError, optional_text, required_text};

pub struct ShippingTool;

impl Tool for ShippingTool {
    fn name(&self) -> &'static str {
        "get_shipping"
    }

    fn description(&self) -> &'static str {
        "Estimates shipping cost and delivery time to a location. `delivery_date` (YYYY-MM-DD) is optional."
    }

    fn parameters(&self) -> &'static [&'static str] {
        &["location", "delivery_date"]
    }

    fn required(&self) -> &'static [&'static str] {
        &["location"]
    }

    fn execute(&self, catalog: &CatalogStore, params: &Parameters) -> Result<Value, ToolError> {
        let location = required_text(params, "location")?;
        let delivery_date = optional_text(params, "delivery_date")?;
        let quote = catalog.shipping_estimate(&location, delivery_date.as_deref())?;
        Ok(json!(quote))
    }
}
