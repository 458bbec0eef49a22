use async_trait::async_trait;
use domain::{Product, ProductId};

use crate::Result;

/// Storage for catalog products and their stock counters.
///
/// Stock only moves through `decrease_stock` and `increase_stock`; reads
/// return a snapshot that may be stale by the time it is acted on. All
/// implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Fetches a single product.
    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>>;

    /// Fetches many products in one round trip.
    ///
    /// Missing IDs are simply absent from the result; callers that need to
    /// tell which ones were found build a lookup map from the result.
    async fn get_products(&self, ids: &[ProductId]) -> Result<Vec<Product>>;

    /// Lists the whole catalog.
    async fn list_products(&self) -> Result<Vec<Product>>;

    /// Inserts or replaces a product. Used for seeding and tests.
    async fn upsert_product(&self, product: &Product) -> Result<()>;

    /// Atomically decrements a product's stock if enough is available.
    ///
    /// The availability check and the decrement are one indivisible
    /// operation, so concurrent callers can never drive the count negative.
    /// Returns `Ok(false)`, leaving the stock untouched, when the product is
    /// missing or holds fewer than `quantity` units.
    async fn decrease_stock(&self, id: &ProductId, quantity: u32) -> Result<bool>;

    /// Increments a product's stock.
    ///
    /// Returns `Ok(false)` when the product no longer exists.
    async fn increase_stock(&self, id: &ProductId, quantity: u32) -> Result<bool>;
}
