// src/intent/keyword.rs

use std::sync::LazyLock;

use regex::Regex;
use serde_json::json;
use tracing::debug;

use crate::catalog::{CatalogStore, parse_price};
use crate::intent::ExtractionError;
use crate::protocol::{Plan, ToolCall};

static DOLLAR_AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\s*(\d[\d,]*(?:\.\d+)?)").expect("dollar pattern is valid")
});
static SIZE_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bsize\s+(xxl|xl|xs|s|m|l|\d{1,2})\b").expect("size pattern is valid")
});
static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4}-\d{2}-\d{2})\b").expect("date pattern is valid"));

const COLORS: &[&str] = &[
    "red", "blue", "black", "white", "green", "yellow", "pink", "purple", "orange", "brown",
    "gray", "grey", "multicolor",
];
const SIZE_WORDS: &[(&str, &str)] = &[("small", "S"), ("medium", "M"), ("large", "L")];
const CODE_MARKERS: &[&str] = &["code", "promo"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Intent {
    Search,
    Compare,
    Shipping,
    Discount,
    ReturnPolicy,
}

/// Checked top to bottom; the first category with a matching keyword wins.
const INTENTS: &[(Intent, &[&str])] = &[
    (Intent::Search, &["search", "find"]),
    (Intent::Compare, &["compare", "price"]),
    (Intent::Shipping, &["shipping", "arrive", "delivery"]),
    (Intent::Discount, &["promo", "discount", "code"]),
    (Intent::ReturnPolicy, &["return", "returns"]),
];

/// Local, model-free extractor driven by keyword and substring tests.
/// Product and store names come from the catalog it is built with.
pub struct KeywordExtractor {
    products: Vec<(String, Option<f64>)>,
    stores: Vec<String>,
}

impl KeywordExtractor {
    pub fn new(catalog: &CatalogStore) -> Self {
        let products = catalog
            .product_names()
            .into_iter()
            .map(|name| {
                let price = catalog.list_price(&name).or_else(|| {
                    catalog.compare_prices(&name).values().copied().reduce(f64::min)
                });
                (name, price)
            })
            .collect();

        Self {
            products,
            stores: catalog.store_names().into_iter().collect(),
        }
    }

    pub fn extract(&self, query: &str) -> Result<Plan, ExtractionError> {
        let lowered = query.to_ascii_lowercase();
        let (intent, keyword) = classify(&lowered).ok_or(ExtractionError::UnknownIntent)?;
        debug!(?intent, keyword, "keyword intent matched");

        let call = match intent {
            Intent::Search => search_call(query, &lowered)?,
            Intent::Compare => self.compare_call(query, &lowered)?,
            Intent::Shipping => shipping_call(query)?,
            Intent::Discount => self.discount_call(query, &lowered)?,
            Intent::ReturnPolicy => self.return_policy_call(&lowered)?,
        };

        Ok(Plan::single(
            call.reasoning(format!("Matched keyword \"{keyword}\".")),
        ))
    }

    fn compare_call(&self, query: &str, lowered: &str) -> Result<ToolCall, ExtractionError> {
        let product = self
            .mentioned_product(lowered)
            .map(|(name, _)| name.clone())
            .or_else(|| trailing_phrase(query, &[" for ", " of "]))
            .ok_or(ExtractionError::MissingParameter {
                tool: "compare_prices",
                parameter: "product_name",
            })?;

        Ok(ToolCall::new("compare_prices").param("product_name", product))
    }

    fn discount_call(&self, query: &str, lowered: &str) -> Result<ToolCall, ExtractionError> {
        let code = promo_code(query).ok_or(ExtractionError::MissingParameter {
            tool: "check_discount",
            parameter: "promo_code",
        })?;

        let price = match dollar_amount(query)? {
            Some(amount) => Some(amount),
            None => self.mentioned_product(lowered).and_then(|(_, price)| *price),
        }
        .ok_or(ExtractionError::MissingParameter {
            tool: "check_discount",
            parameter: "price",
        })?;

        Ok(ToolCall::new("check_discount")
            .param("promo_code", code)
            .param("price", price))
    }

    fn return_policy_call(&self, lowered: &str) -> Result<ToolCall, ExtractionError> {
        let store = self
            .stores
            .iter()
            .filter(|store| lowered.contains(&store.to_ascii_lowercase()))
            .max_by_key(|store| store.len())
            .ok_or(ExtractionError::MissingParameter {
                tool: "get_return_policy",
                parameter: "store_name",
            })?;

        Ok(ToolCall::new("get_return_policy").param("store_name", store.as_str()))
    }

    fn mentioned_product(&self, lowered: &str) -> Option<&(String, Option<f64>)> {
        self.products
            .iter()
            .filter(|(name, _)| lowered.contains(&name.to_ascii_lowercase()))
            .max_by_key(|(name, _)| name.len())
    }
}

fn classify(lowered: &str) -> Option<(Intent, &'static str)> {
    INTENTS.iter().find_map(|(intent, keywords)| {
        keywords
            .iter()
            .copied()
            .find(|keyword| lowered.contains(keyword))
            .map(|keyword| (*intent, keyword))
    })
}

fn search_call(query: &str, lowered: &str) -> Result<ToolCall, ExtractionError> {
    let words = words(lowered);
    let mut call = ToolCall::new("search_products");

    if let Some(color) = COLORS.iter().find(|color| words.contains(color)) {
        call = call.param("color", *color);
    }
    if let Some(price) = dollar_amount(query)? {
        call = call.param("price", price);
    }
    if let Some(size) = size(query, &words) {
        call = call.param("size", size);
    }

    Ok(call)
}

fn shipping_call(query: &str) -> Result<ToolCall, ExtractionError> {
    let location = trailing_phrase(query, &[" to "])
        .or_else(|| trailing_phrase(query, &[" in "]))
        .ok_or(ExtractionError::MissingParameter {
            tool: "get_shipping",
            parameter: "location",
        })?;

    let mut call = ToolCall::new("get_shipping").param("location", location);
    if let Some(date) = ISO_DATE.captures(query) {
        call = call.param("delivery_date", &date[1]);
    }
    Ok(call)
}

fn words(lowered: &str) -> Vec<&str> {
    lowered
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect()
}

fn dollar_amount(query: &str) -> Result<Option<f64>, ExtractionError> {
    DOLLAR_AMOUNT
        .captures(query)
        .map(|caps| {
            let text = &caps[1];
            parse_price(&json!(text)).map_err(|_| ExtractionError::InvalidPrice(text.to_string()))
        })
        .transpose()
}

fn size(query: &str, words: &[&str]) -> Option<String> {
    SIZE_PHRASE
        .captures(query)
        .map(|caps| caps[1].to_ascii_uppercase())
        .or_else(|| {
            SIZE_WORDS
                .iter()
                .find(|(word, _)| words.contains(word))
                .map(|(_, size)| size.to_string())
        })
}

/// First token after a literal `code`/`promo`. Unknown codes are left for
/// the catalog to reject with a zero discount.
fn promo_code(query: &str) -> Option<String> {
    let tokens: Vec<&str> = query
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_ascii_alphanumeric()))
        .filter(|t| !t.is_empty())
        .collect();
    let is_marker = |token: &str| CODE_MARKERS.iter().any(|m| token.eq_ignore_ascii_case(m));

    let marker = tokens.iter().position(|token| is_marker(token))?;
    tokens[marker + 1..]
        .iter()
        .find(|token| !is_marker(token))
        .map(|token| token.to_ascii_uppercase())
}

/// Text after the last occurrence of any marker, up to the end of the clause.
/// A clause ends at punctuation or at a trailing `by`/`and`/`in`/`on` phrase.
/// Markers must be ASCII so byte offsets line up with the original query.
fn trailing_phrase(query: &str, markers: &[&str]) -> Option<String> {
    let lowered = query.to_ascii_lowercase();
    let start = markers
        .iter()
        .filter_map(|marker| lowered.rfind(marker).map(|i| i + marker.len()))
        .max()?;

    let rest = &query[start..];
    let rest_lowered = &lowered[start..];
    let end = [
        rest.find(['?', '!', ',']),
        rest_lowered.find(" by "),
        rest_lowered.find(" and "),
        rest_lowered.find(" in "),
        rest_lowered.find(" on "),
    ]
    .into_iter()
    .flatten()
    .min()
    .unwrap_or(rest.len());

    let phrase = rest[..end].trim().trim_end_matches('.');
    let phrase = match phrase.get(..4) {
        Some(prefix) if prefix.eq_ignore_ascii_case("the ") => &phrase[4..],
        _ => phrase,
    }
    .trim();

    (!phrase.is_empty()).then(|| phrase.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn extractor() -> KeywordExtractor {
        KeywordExtractor::new(&CatalogStore::demo())
    }

    fn single(query: &str) -> ToolCall {
        let plan = extractor().extract(query).unwrap();
        assert_eq!(plan.len(), 1);
        plan.steps.into_iter().next().unwrap()
    }

    #[test]
    fn search_with_color_price_and_size() {
        let call = single("Find me a red skirt under $40");
        assert_eq!(call.tool, "search_products");
        assert_eq!(call.parameters["color"], "red");
        assert_eq!(call.parameters["price"], json!(40.0));
        assert!(call.parameters.get("size").is_none());

        let call = single("Search for blue jackets in size m");
        assert_eq!(call.parameters["color"], "blue");
        assert_eq!(call.parameters["size"], "M");

        let call = single("find something large and black");
        assert_eq!(call.parameters["size"], "L");
        assert_eq!(call.parameters["color"], "black");
    }

    #[test]
    fn search_wins_over_later_categories() {
        let call = single("Find the cheapest price with code SAVE10");
        assert_eq!(call.tool, "search_products");
    }

    #[test]
    fn compare_uses_catalog_name_or_trailing_phrase() {
        let call = single("compare prices for the denim jacket please");
        assert_eq!(call.parameters["product_name"], "Denim Jacket");

        let call = single("Compare prices for Blue Jacket");
        assert_eq!(call.parameters["product_name"], "Blue Jacket");

        assert!(matches!(
            extractor().extract("compare"),
            Err(ExtractionError::MissingParameter { parameter: "product_name", .. })
        ));
    }

    #[test]
    fn shipping_destination_and_date() {
        let call = single("What's the shipping cost to New York?");
        assert_eq!(call.tool, "get_shipping");
        assert_eq!(call.parameters["location"], "New York");
        assert!(call.parameters.get("delivery_date").is_none());

        let call = single("Will it arrive in Boston by 2030-01-15?");
        assert_eq!(call.parameters["location"], "Boston");
        assert_eq!(call.parameters["delivery_date"], "2030-01-15");

        let call = single("What's the shipping cost to New York in December?");
        assert_eq!(call.parameters["location"], "New York");

        let call = single("Can delivery to Chicago on Friday be arranged?");
        assert_eq!(call.parameters["location"], "Chicago");

        assert!(matches!(
            extractor().extract("how does delivery work?"),
            Err(ExtractionError::MissingParameter { parameter: "location", .. })
        ));
    }

    #[test]
    fn discount_code_and_price() {
        let call = single("Apply promo code save20 on a $100 order");
        assert_eq!(call.tool, "check_discount");
        assert_eq!(call.parameters["promo_code"], "SAVE20");
        assert_eq!(call.parameters["price"], json!(100.0));

        let call = single("Does discount code SAVE10 work on White Sneakers?");
        assert_eq!(call.parameters["price"], json!(65.0));

        assert!(matches!(
            extractor().extract("Check discount with code SAVE10"),
            Err(ExtractionError::MissingParameter { parameter: "price", .. })
        ));
        let call = single("Check discount code welcome on a $50 order");
        assert_eq!(call.parameters["promo_code"], "WELCOME");
        assert_eq!(call.parameters["price"], json!(50.0));

        let call = single("Apply promo code FreeShip to my $50 cart");
        assert_eq!(call.parameters["promo_code"], "FREESHIP");

        assert!(matches!(
            extractor().extract("is there a discount for students?"),
            Err(ExtractionError::MissingParameter { parameter: "promo_code", .. })
        ));
    }

    #[test]
    fn return_policy_store() {
        let call = single("What's the return policy for StoreA?");
        assert_eq!(call.tool, "get_return_policy");
        assert_eq!(call.parameters["store_name"], "StoreA");

        assert!(matches!(
            extractor().extract("What's the return policy for Walmart?"),
            Err(ExtractionError::MissingParameter { parameter: "store_name", .. })
        ));
    }

    #[test]
    fn no_category_is_unknown_intent() {
        assert!(matches!(
            extractor().extract("Hello there"),
            Err(ExtractionError::UnknownIntent)
        ));
    }

    #[test]
    fn trailing_phrase_cuts_clause() {
        assert_eq!(
            trailing_phrase("ship it to St. Louis, thanks", &[" to "]),
            Some("St. Louis".into())
        );
        assert_eq!(trailing_phrase("ship to ?", &[" to "]), None);
        assert_eq!(trailing_phrase("nothing here", &[" to "]), None);
    }
}
