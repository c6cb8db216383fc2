// src/catalog/mod.rs

//! Static, read-only product catalog backing every shopping tool.
//!
//! The store is built once and only ever read afterwards, so a single
//! instance can be shared between threads without locking.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Days, Local, NaiveDate};
use rand::Rng;
use serde::Serialize;
use thiserror::Error;

mod fixtures;
pub mod price;

pub use price::{parse_price, round_cents};

/// Returned by [`CatalogStore::return_policy`] for stores without a policy.
pub const POLICY_NOT_FOUND: &str = "Policy not found";

const SHIPPING_COST_RANGE: std::ops::RangeInclusive<u32> = 5..=20;
const SHIPPING_DAYS_RANGE: std::ops::RangeInclusive<u32> = 3..=7;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    #[error("invalid price value `{0}`")]
    InvalidPrice(String),
    #[error("invalid delivery date `{0}`, expected YYYY-MM-DD")]
    InvalidDate(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub name: String,
    pub color: String,
    pub price: f64,
    pub size: String,
    pub in_stock: bool,
}

impl Product {
    pub fn new(name: &str, color: &str, price: f64, size: &str, in_stock: bool) -> Self {
        Self {
            name: name.to_string(),
            color: color.to_string(),
            price,
            size: size.to_string(),
            in_stock,
        }
    }
}

/// Conjunctive product filter. `None` matches everything.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    pub color: Option<String>,
    pub max_price: Option<f64>,
    pub size: Option<String>,
}

impl SearchFilter {
    fn matches(&self, product: &Product) -> bool {
        let color_ok = self
            .color
            .as_deref()
            .is_none_or(|c| product.color.eq_ignore_ascii_case(c));
        let price_ok = self.max_price.is_none_or(|max| product.price <= max);
        let size_ok = self
            .size
            .as_deref()
            .is_none_or(|s| product.size.eq_ignore_ascii_case(s));

        color_ok && price_ok && size_ok
    }
}

/// Shipping estimate. The values come from a random stub until a carrier
/// integration exists, so only their ranges are stable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShippingQuote {
    pub location: String,
    pub cost: u32,
    pub days: u32,
    pub estimated_delivery: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_delivery: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrives_by_requested_date: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscountQuote {
    pub promo_code: String,
    pub original_price: f64,
    pub discount_percentage: u32,
    pub final_price: f64,
    pub discount_applied: bool,
}

#[derive(Debug, Clone)]
pub struct CatalogStore {
    products: Vec<Product>,
    store_prices: BTreeMap<String, BTreeMap<String, f64>>,
    return_policies: BTreeMap<String, String>,
    promo_codes: BTreeMap<String, u32>,
}

impl CatalogStore {
    pub fn new(
        products: Vec<Product>,
        store_prices: BTreeMap<String, BTreeMap<String, f64>>,
        return_policies: BTreeMap<String, String>,
        promo_codes: BTreeMap<String, u32>,
    ) -> Self {
        Self {
            products,
            store_prices,
            return_policies,
            promo_codes,
        }
    }

    /// The built-in demo catalog.
    pub fn demo() -> Self {
        Self::new(
            fixtures::products(),
            fixtures::store_prices(),
            fixtures::return_policies(),
            fixtures::promo_codes(),
        )
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn search(&self, filter: &SearchFilter) -> Vec<Product> {
        self.products
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect()
    }

    /// Store → price for a product; empty when the product is unknown.
    pub fn compare_prices(&self, product_name: &str) -> BTreeMap<String, f64> {
        self.store_prices
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(product_name.trim()))
            .map(|(_, prices)| prices.clone())
            .unwrap_or_default()
    }

    pub fn shipping_estimate(
        &self,
        location: &str,
        delivery_date: Option<&str>,
    ) -> Result<ShippingQuote, CatalogError> {
        let today = Local::now().date_naive();
        self.shipping_estimate_from(&mut rand::thread_rng(), today, location, delivery_date)
    }

    pub(crate) fn shipping_estimate_from<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        today: NaiveDate,
        location: &str,
        delivery_date: Option<&str>,
    ) -> Result<ShippingQuote, CatalogError> {
        let requested_delivery = delivery_date
            .map(|raw| {
                NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                    .map_err(|_| CatalogError::InvalidDate(raw.to_string()))
            })
            .transpose()?;

        let cost = rng.gen_range(SHIPPING_COST_RANGE);
        let days = rng.gen_range(SHIPPING_DAYS_RANGE);
        let estimated_delivery = today + Days::new(u64::from(days));

        Ok(ShippingQuote {
            location: location.trim().to_string(),
            cost,
            days,
            estimated_delivery,
            requested_delivery,
            arrives_by_requested_date: requested_delivery.map(|d| estimated_delivery <= d),
        })
    }

    pub fn apply_discount(
        &self,
        base_price: f64,
        promo_code: &str,
    ) -> Result<DiscountQuote, CatalogError> {
        if !base_price.is_finite() || base_price < 0.0 {
            return Err(CatalogError::InvalidPrice(base_price.to_string()));
        }

        let code = promo_code.trim();
        let pct = self
            .promo_codes
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(code))
            .map(|(_, pct)| *pct)
            .unwrap_or(0);

        Ok(DiscountQuote {
            promo_code: code.to_string(),
            original_price: base_price,
            discount_percentage: pct,
            final_price: round_cents(base_price * (1.0 - f64::from(pct) / 100.0)),
            discount_applied: pct > 0,
        })
    }

    /// Policy text, or [`POLICY_NOT_FOUND`].
    pub fn return_policy(&self, store_name: &str) -> String {
        self.return_policies
            .iter()
            .find(|(store, _)| store.eq_ignore_ascii_case(store_name.trim()))
            .map(|(_, policy)| policy.clone())
            .unwrap_or_else(|| POLICY_NOT_FOUND.to_string())
    }

    /// List price of a catalog product, matched case-insensitively.
    pub fn list_price(&self, product_name: &str) -> Option<f64> {
        self.products
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(product_name))
            .map(|p| p.price)
    }

    /// Every product name known to either the product list or the price table.
    pub fn product_names(&self) -> BTreeSet<String> {
        self.products
            .iter()
            .map(|p| p.name.clone())
            .chain(self.store_prices.keys().cloned())
            .collect()
    }

    pub fn store_names(&self) -> BTreeSet<String> {
        self.store_prices
            .values()
            .flat_map(|prices| prices.keys().cloned())
            .chain(self.return_policies.keys().cloned())
            .collect()
    }
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::demo()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn filter(color: Option<&str>, max_price: Option<f64>, size: Option<&str>) -> SearchFilter {
        SearchFilter {
            color: color.map(str::to_string),
            max_price,
            size: size.map(str::to_string),
        }
    }

    #[test]
    fn search_without_filters_returns_everything() {
        let store = CatalogStore::demo();
        assert_eq!(store.search(&SearchFilter::default()).len(), store.products().len());
    }

    #[test]
    fn search_by_color_is_case_insensitive() {
        let store = CatalogStore::demo();
        let hits = store.search(&filter(Some("RED"), None, None));
        assert!(!hits.is_empty());
        assert!(hits.iter().all(|p| p.color.eq_ignore_ascii_case("red")));
    }

    #[test]
    fn search_price_is_inclusive_upper_bound() {
        let store = CatalogStore::demo();
        let hits = store.search(&filter(None, Some(38.0), None));
        let names: Vec<_> = hits.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Floral Skirt", "Red Pleated Skirt"]);
        assert!(store.search(&filter(None, Some(40.0), None)).iter().all(|p| p.price <= 40.0));
    }

    #[test]
    fn search_filters_are_conjunctive() {
        let store = CatalogStore::demo();
        let hits = store.search(&filter(Some("blue"), Some(100.0), Some("m")));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Denim Jacket");

        assert!(store.search(&filter(Some("blue"), Some(40.0), None)).is_empty());
        assert!(store.search(&filter(Some("red"), None, Some("XL"))).is_empty());
    }

    #[test]
    fn compare_prices_unknown_product_is_empty() {
        let store = CatalogStore::demo();
        assert!(store.compare_prices("NoSuchProduct").is_empty());

        let prices = store.compare_prices("denim jacket");
        assert_eq!(prices.get("StoreC"), Some(&72.0));
        assert_eq!(prices.len(), 3);
    }

    #[test]
    fn discount_known_and_unknown_codes() {
        let store = CatalogStore::demo();

        let saved = store.apply_discount(100.0, "SAVE10").unwrap();
        assert_eq!(saved.final_price, 90.0);
        assert_eq!(saved.discount_percentage, 10);
        assert!(saved.discount_applied);

        let lower = store.apply_discount(65.0, "save20").unwrap();
        assert_eq!(lower.final_price, 52.0);

        let unknown = store.apply_discount(100.0, "UNKNOWN").unwrap();
        assert_eq!(unknown.final_price, 100.0);
        assert_eq!(unknown.discount_percentage, 0);
        assert!(!unknown.discount_applied);
    }

    #[test]
    fn discount_rejects_negative_price() {
        let store = CatalogStore::demo();
        assert!(matches!(
            store.apply_discount(-1.0, "SAVE10"),
            Err(CatalogError::InvalidPrice(_))
        ));
    }

    #[test]
    fn return_policy_sentinel() {
        let store = CatalogStore::demo();
        assert_eq!(store.return_policy("StoreA"), "30-day returns");
        assert_eq!(store.return_policy("storeb"), "14-day returns");
        assert_eq!(store.return_policy("Nowhere"), POLICY_NOT_FOUND);
    }

    #[test]
    fn shipping_stays_in_range() {
        let store = CatalogStore::demo();
        for _ in 0..50 {
            let quote = store.shipping_estimate("New York", None).unwrap();
            assert!(SHIPPING_COST_RANGE.contains(&quote.cost));
            assert!(SHIPPING_DAYS_RANGE.contains(&quote.days));
            assert_eq!(quote.location, "New York");
            assert!(quote.requested_delivery.is_none());
        }
    }

    #[test]
    fn shipping_compares_requested_date() {
        let store = CatalogStore::demo();
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        let quote = store
            .shipping_estimate_from(&mut rng, today, "Boston", Some("2024-03-31"))
            .unwrap();
        assert_eq!(quote.arrives_by_requested_date, Some(true));
        assert_eq!(quote.estimated_delivery, today + Days::new(u64::from(quote.days)));

        let quote = store
            .shipping_estimate_from(&mut rng, today, "Boston", Some("2024-03-02"))
            .unwrap();
        assert_eq!(quote.arrives_by_requested_date, Some(false));
    }

    #[test]
    fn shipping_rejects_bad_date() {
        let store = CatalogStore::demo();
        assert_eq!(
            store.shipping_estimate("Boston", Some("next friday")),
            Err(CatalogError::InvalidDate("next friday".into()))
        );
    }

    #[test]
    fn store_and_product_names_cover_fixtures() {
        let store = CatalogStore::demo();
        assert!(store.store_names().contains("StoreC"));
        assert!(store.product_names().contains("Denim Jacket"));
        assert_eq!(store.list_price("white sneakers"), Some(65.0));
    }
}
