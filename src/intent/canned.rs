// src/intent/canned.rs

use tracing::{debug, warn};

use crate::intent::ExtractionError;
use crate::protocol::{Plan, ToolCall};

/// Fixed example queries and the plans they map to.
pub struct CannedExtractor {
    examples: Vec<(&'static str, Plan)>,
    fallback_to_search: bool,
}

impl CannedExtractor {
    /// Unmatched queries fall back to an unfiltered product search.
    pub fn new() -> Self {
        Self {
            examples: examples(),
            fallback_to_search: true,
        }
    }

    /// With the fallback off, unmatched queries fail with `UnknownIntent`.
    pub fn with_fallback(mut self, enabled: bool) -> Self {
        self.fallback_to_search = enabled;
        self
    }

    pub fn example_queries(&self) -> Vec<&'static str> {
        self.examples.iter().map(|(query, _)| *query).collect()
    }

    pub fn extract(&self, query: &str) -> Result<Plan, ExtractionError> {
        let query = query.trim();

        if let Some((_, plan)) = self.examples.iter().find(|(example, _)| *example == query) {
            debug!(steps = plan.len(), "matched canned example");
            return Ok(plan.clone());
        }

        if !self.fallback_to_search {
            return Err(ExtractionError::UnknownIntent);
        }

        warn!("no canned example matched, falling back to unfiltered search");
        Ok(Plan::single(
            ToolCall::new("search_products").reasoning("No example matched; listing all products."),
        ))
    }
}

impl Default for CannedExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn examples() -> Vec<(&'static str, Plan)> {
    vec![
        (
            "Find me a red skirt under $40",
            Plan::single(
                ToolCall::new("search_products")
                    .param("color", "red")
                    .param("price", 40.0)
                    .reasoning("Product search filtered by color and maximum price."),
            ),
        ),
        (
            "Compare prices for Denim Jacket and apply code SAVE10",
            Plan::new(vec![
                ToolCall::new("compare_prices")
                    .param("product_name", "Denim Jacket")
                    .reasoning("Find the best store price first."),
                ToolCall::new("check_discount")
                    .param("promo_code", "SAVE10")
                    .param("price", 72.0)
                    .reasoning("Apply the promo code to the lowest store price."),
            ]),
        ),
        (
            "What's the shipping cost to New York?",
            Plan::single(
                ToolCall::new("get_shipping")
                    .param("location", "New York")
                    .reasoning("Shipping estimate for the destination."),
            ),
        ),
        (
            "What's the return policy for StoreA, and does SAVE20 work on White Sneakers?",
            Plan::new(vec![
                ToolCall::new("get_return_policy")
                    .param("store_name", "StoreA")
                    .reasoning("Return policy lookup."),
                ToolCall::new("check_discount")
                    .param("promo_code", "SAVE20")
                    .param("price", 65.0)
                    .reasoning("Promo code applied to the sneakers' list price."),
            ]),
        ),
    ]
}
