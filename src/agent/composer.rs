// src/agent/composer.rs

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::POLICY_NOT_FOUND;
use crate::protocol::{QueryResponse, StepResult};

/// How per-step sentences become the natural-language summary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SummaryMode {
    /// One sentence per step, in step order.
    #[default]
    Concatenate,
    /// Only the last step's sentence is kept.
    LastStep,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseComposer {
    mode: SummaryMode,
}

impl ResponseComposer {
    pub fn new(mode: SummaryMode) -> Self {
        Self { mode }
    }

    pub fn compose(&self, query: &str, steps: Vec<StepResult>) -> QueryResponse {
        let summary = self.summarize(&steps);
        QueryResponse::success(query, steps, summary)
    }

    pub fn summarize(&self, steps: &[StepResult]) -> Option<String> {
        let sentences = steps.iter().map(describe_step);
        match self.mode {
            SummaryMode::Concatenate => {
                let all: Vec<String> = sentences.collect();
                (!all.is_empty()).then(|| all.join(" "))
            }
            SummaryMode::LastStep => sentences.last(),
        }
    }
}

/// Sentence for one step, from the template of its tool.
pub fn describe_step(step: &StepResult) -> String {
    if let Some(error) = &step.error {
        return format!("The {} step failed: {}.", step.tool, error);
    }

    let result = &step.result;
    match step.tool.as_str() {
        "search_products" => describe_search(result),
        "compare_prices" => describe_prices(&param_text(step, "product_name"), result),
        "get_shipping" => describe_shipping(result),
        "check_discount" => describe_discount(result),
        "get_return_policy" => describe_policy(&param_text(step, "store_name"), result),
        other => format!("I completed the {other} request."),
    }
}

fn describe_search(result: &Value) -> String {
    let products = result.as_array().map(Vec::as_slice).unwrap_or_default();
    if products.is_empty() {
        return "I couldn't find any products matching your criteria.".to_string();
    }

    let listed = products
        .iter()
        .map(|p| {
            let name = p["name"].as_str().unwrap_or("unnamed product");
            match p["price"].as_f64() {
                Some(price) => format!("{name} ({})", money(price)),
                None => name.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(", ");

    let noun = if products.len() == 1 { "product" } else { "products" };
    format!(
        "I found {} {noun} matching your criteria: {listed}.",
        products.len()
    )
}

fn describe_prices(product: &str, result: &Value) -> String {
    let prices: Vec<(&str, f64)> = result
        .as_object()
        .map(|stores| {
            stores
                .iter()
                .filter_map(|(store, price)| price.as_f64().map(|p| (store.as_str(), p)))
                .collect()
        })
        .unwrap_or_default();

    let Some((best_store, best_price)) = prices
        .iter()
        .copied()
        .min_by(|a, b| a.1.total_cmp(&b.1))
    else {
        return format!("I couldn't find price information for {product}.");
    };

    let listed = prices
        .iter()
        .map(|(store, price)| format!("{store} {}", money(*price)))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Prices for {product}: {listed}. The best price is {} at {best_store}.",
        money(best_price)
    )
}

fn describe_shipping(result: &Value) -> String {
    let location = result["location"].as_str().unwrap_or("your location");
    let cost = result["cost"].as_f64().unwrap_or_default();
    let days = result["days"].as_u64().unwrap_or_default();

    let mut sentence = format!(
        "Shipping to {location} will cost {} and take {days} days",
        money(cost)
    );
    if let Some(date) = result["estimated_delivery"].as_str() {
        sentence.push_str(&format!(" (estimated delivery {date})"));
    }
    sentence.push('.');

    if let (Some(on_time), Some(requested)) = (
        result["arrives_by_requested_date"].as_bool(),
        result["requested_delivery"].as_str(),
    ) {
        let verdict = if on_time { "will" } else { "will not" };
        sentence.push_str(&format!(" It {verdict} arrive by {requested}."));
    }

    sentence
}

fn describe_discount(result: &Value) -> String {
    let code = result["promo_code"].as_str().unwrap_or("the code");
    let original = result["original_price"].as_f64().unwrap_or_default();
    let final_price = result["final_price"].as_f64().unwrap_or(original);

    if result["discount_applied"].as_bool().unwrap_or(false) {
        let pct = result["discount_percentage"].as_u64().unwrap_or_default();
        format!(
            "Code {code} takes {pct}% off: {} becomes {}.",
            money(original),
            money(final_price)
        )
    } else {
        format!(
            "Code {code} is not valid, so the price stays at {}.",
            money(original)
        )
    }
}

fn describe_policy(store: &str, result: &Value) -> String {
    match result.as_str() {
        Some(policy) if policy != POLICY_NOT_FOUND => format!("{store} offers {policy}."),
        _ => format!("I couldn't find a return policy for {store}."),
    }
}

fn param_text(step: &StepResult, name: &str) -> String {
    match step.parameters.get(name) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "that item".to_string(),
        Some(other) => other.to_string(),
    }
}

fn money(amount: f64) -> String {
    format!("${amount:.2}")
}
