use async_trait::async_trait;
use common::OrderId;
use domain::{Order, UserId};

use crate::Result;

/// Storage for order aggregates.
///
/// Updates are guarded by the aggregate's version for optimistic
/// concurrency. All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Fetches an order by ID.
    async fn get(&self, id: &OrderId) -> Result<Option<Order>>;

    /// Inserts a new order at its current version.
    async fn insert(&self, order: &Order) -> Result<()>;

    /// Persists an order guarded by its version.
    ///
    /// Succeeds only when the stored version equals `order.version()`,
    /// persisting and returning `order.version() + 1`. Fails with
    /// `VersionConflict` when another writer got there first; the caller's
    /// changes are not persisted in that case.
    async fn update(&self, order: &Order) -> Result<u64>;

    /// Lists a user's orders, most recently touched first.
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Order>>;
}
