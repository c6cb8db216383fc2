use serde_json::{Value, json};

use crate::catalog::CatalogStore;
use crate::tools::{Parameters, Tool, ToolError, required_price, required_text};

pub struct DiscountTool;

impl Tool for DiscountTool {
    fn name(&self) -> &'static str {
        "check_discount"
    }

    fn description(&self) -> &'static str {
        "Applies a promo code to a base price and returns the discounted price."
    }

    fn parameters(&self) -> &'static [&'static str] {
        &["promo_code", "price"]
    }

    fn required(&self) -> &'static [&'static str] {
        &["promo_code", "price"]
    }

    fn execute(&self, catalog: &CatalogStore, params: &Parameters) -> Result<Value, ToolError> {
        let code = required_text(params, "promo_code")?;
        let price = required_price(params, "price")?;
        let quote = catalog.apply_discount(price, &code)?;
        Ok(json!(quote))
    }
}
