// src/catalog/price.rs

use serde_json::Value;

use crate::catalog::CatalogError;

/// Parses a price given either as a JSON number or as currency text such as
/// `"$1,299.50"`. Negative and non-finite amounts are rejected.
pub fn parse_price(value: &Value) -> Result<f64, CatalogError> {
    let amount = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_price_text(s),
        _ => None,
    };

    match amount {
        Some(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(CatalogError::InvalidPrice(display_raw(value))),
    }
}

fn parse_price_text(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

fn display_raw(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Rounds to cents.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
