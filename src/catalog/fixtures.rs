// src/catalog/fixtures.rs

use std::collections::BTreeMap;

use crate::catalog::Product;

pub(crate) fn products() -> Vec<Product> {
    vec![
        Product::new("Floral Skirt", "multicolor", 35.0, "S", true),
        Product::new("Red Pleated Skirt", "red", 38.0, "S", true),
        Product::new("White Sneakers", "white", 65.0, "8", true),
        Product::new("Denim Jacket", "blue", 75.0, "M", true),
        Product::new("Cocktail Dress", "black", 90.0, "M", false),
    ]
}

pub(crate) fn store_prices() -> BTreeMap<String, BTreeMap<String, f64>> {
    let table: [(&str, &[(&str, f64)]); 4] = [
        ("Floral Skirt", &[("StoreA", 35.0), ("StoreB", 38.0)]),
        ("Red Pleated Skirt", &[("StoreA", 38.0), ("StoreC", 36.5)]),
        ("White Sneakers", &[("StoreA", 65.0), ("StoreB", 70.0)]),
        ("Denim Jacket", &[("StoreA", 80.0), ("StoreB", 75.0), ("StoreC", 72.0)]),
    ];

    table
        .into_iter()
        .map(|(product, stores)| {
            let prices = stores
                .iter()
                .map(|(store, price)| (store.to_string(), *price))
                .collect();
            (product.to_string(), prices)
        })
        .collect()
}

pub(crate) fn return_policies() -> BTreeMap<String, String> {
    [
        ("StoreA", "30-day returns"),
        ("StoreB", "14-day returns"),
        ("StoreC", "7-day returns, store credit only"),
    ]
    .into_iter()
    .map(|(store, policy)| (store.to_string(), policy.to_string()))
    .collect()
}

pub(crate) fn promo_codes() -> BTreeMap<String, u32> {
    [("SAVE10", 10), ("SAVE20", 20)]
        .into_iter()
        .map(|(code, pct)| (code.to_string(), pct))
        .collect()
}
