use serde_json::{Value, json};

use crate::catalog::{CatalogStore, SearchFilter};
use crate::tools::{Parameters, Tool, ToolError, optional_price, optional_text};

pub struct SearchProductsTool;

impl Tool for SearchProductsTool {
    fn name(&self) -> &'static str {
        "search_products"
    }

    fn description(&self) -> &'static str {
        "Searches the catalog. `price` is a maximum price; every filter is optional and filters combine with AND."
    }

    fn parameters(&self) -> &'static [&'static str] {
        &["color", "price", "size"]
    }

    fn execute(&self, catalog: &CatalogStore, params: &Parameters) -> Result<Value, ToolError> {
        let filter = SearchFilter {
            color: optional_text(params, "color")?,
            max_price: optional_price(params, "price")?,
            size: optional_text(params, "size")?,
        };

        let hits = catalog.search(&filter);
        Ok(json!(hits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogError;

    #[test]
    fn accepts_currency_formatted_max_price() {
        let params = json!({ "color": "red", "price": "$40" });
        let out = SearchProductsTool
            .execute(&CatalogStore::demo(), params.as_object().unwrap())
            .unwrap();
        let hits = out.as_array().unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["name"], "Red Pleated Skirt");
    }

    #[test]
    fn invalid_price_is_an_error_not_a_default() {
        let params = json!({ "price": "under forty" });
        let err = SearchProductsTool
            .execute(&CatalogStore::demo(), params.as_object().unwrap())
            .unwrap_err();
        assert_eq!(
            err,
            ToolError::Catalog(CatalogError::InvalidPrice("under forty".into()))
        );
    }
}
