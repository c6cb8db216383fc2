use serde_json::{Value, json};

use crate::catalog::CatalogStore;
use crate::tools::{Parameters, Tool, ToolError, required_text};

pub struct ComparePricesTool;

impl Tool for ComparePricesTool {
    fn name(&self) -> &'static str {
        "compare_prices"
    }

    fn description(&self) -> &'static str {
        "Compares the price of one product across stores."
    }

    fn parameters(&self) -> &'static [&'static str] {
        &["product_name"]
    }

    fn required(&self) -> &'static [&'static str] {
        &["product_name"]
    }

    fn execute(&self, catalog: &CatalogStore, params: &Parameters) -> Result<Value, ToolError> {
        let product = required_text(params, "product_name")?;
        Ok(json!(catalog.compare_prices(&product)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_product_yields_empty_object() {
        let params = json!({ "product_name": "NoSuchProduct" });
        let out = ComparePricesTool
            .execute(&CatalogStore::demo(), params.as_object().unwrap())
            .unwrap();
        assert_eq!(out, json!({}));
    }

    #[test]
    fn known_product_lists_every_store() {
        let params = json!({ "product_name": "White Sneakers" });
        let out = ComparePricesTool
            .execute(&CatalogStore::demo(), params.as_object().unwrap())
            .unwrap();
        assert_eq!(out, json!({ "StoreA": 65.0, "StoreB": 70.0 }));
    }
}
