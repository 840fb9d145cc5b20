//! Static menu and order fixtures backing the template pipeline.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use super::types::Order;

/// Unit prices in pounds.
pub static MENU: LazyLock<BTreeMap<&'static str, f64>> = LazyLock::new(|| {
    BTreeMap::from([
        ("beef", 8.2),
        ("lamb", 9.5),
        ("chicken", 7.4),
        ("rice", 2.3),
        ("naan", 1.8),
        ("cola", 1.2),
    ])
});

fn order(items: &[(&str, u32)]) -> Order {
    items
        .iter()
        .map(|(item, quantity)| (item.to_string(), *quantity))
        .collect()
}

pub static ORDERS: LazyLock<BTreeMap<&'static str, Order>> = LazyLock::new(|| {
    BTreeMap::from([
        ("A001", order(&[("beef", 1), ("lamb", 1)])),
        ("A002", order(&[("chicken", 2), ("rice", 2), ("naan", 1)])),
        ("A003", order(&[("cola", 3)])),
    ])
});
