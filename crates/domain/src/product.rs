//! Catalog product snapshot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Product identifier (SKU).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Creates a new product ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the product ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ProductId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A catalog product as seen by the checkout flow.
///
/// The stock count here is the value read at lookup time; the authoritative
/// count lives in the catalog store and only moves through its conditional
/// decrement and increment operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// The product identifier.
    pub id: ProductId,

    /// Human-readable product name.
    pub name: String,

    /// Current price per unit.
    pub unit_price: Money,

    /// Units in stock at read time.
    pub stock: u32,

    /// Merchandising category.
    pub category: String,

    /// Rating histogram: star value (1..=5) to vote count.
    #[serde(default)]
    pub rating: BTreeMap<u8, u32>,
}

impl Product {
    /// Creates a product with an empty rating histogram.
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        unit_price: Money,
        stock: u32,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit_price,
            stock,
            category: category.into(),
            rating: BTreeMap::new(),
        }
    }

    /// Returns the weighted average star rating, rounded to one decimal.
    ///
    /// Products with no votes rate 0.0.
    pub fn average_rating(&self) -> f32 {
        let total: u64 = self.rating.values().map(|&count| count as u64).sum();
        if total == 0 {
            return 0.0;
        }
        let weighted: u64 = self
            .rating
            .iter()
            .map(|(&star, &count)| star as u64 * count as u64)
            .sum();
        let average = weighted as f64 / total as f64;
        ((average * 10.0).round() / 10.0) as f32
    }
}
