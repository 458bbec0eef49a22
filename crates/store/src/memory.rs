use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use common::OrderId;
use domain::{Order, Product, ProductId, UserId};
use tokio::sync::RwLock;

use crate::{CatalogStore, OrderStore, Result, StoreError};

#[derive(Debug, Default)]
struct CatalogState {
    products: HashMap<ProductId, Product>,
    denied_decreases: HashSet<ProductId>,
    faulted_decreases: HashSet<ProductId>,
    fail_on_decrease: bool,
    fail_on_increase: bool,
}

/// In-memory catalog store.
///
/// Backs tests and the demo server mode. The whole stock movement runs
/// under one write lock, which gives the same atomicity as the conditional
/// UPDATE in the PostgreSQL implementation. The failure toggles let tests
/// exercise refusal and fault paths deterministically.
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    state: Arc<RwLock<CatalogState>>,
}

impl InMemoryCatalog {
    /// Creates a new empty in-memory catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every decrease of the given product report insufficient stock,
    /// regardless of the actual count.
    pub async fn deny_decrease(&self, id: &ProductId) {
        self.state.write().await.denied_decreases.insert(id.clone());
    }

    /// Makes every decrease of the given product fail with a database
    /// error, leaving other products working.
    pub async fn fail_decrease_of(&self, id: &ProductId) {
        self.state
            .write()
            .await
            .faulted_decreases
            .insert(id.clone());
    }

    /// Configures decrease calls to fail with a database error.
    pub async fn set_fail_on_decrease(&self, fail: bool) {
        self.state.write().await.fail_on_decrease = fail;
    }

    /// Configures increase calls to fail with a database error.
    pub async fn set_fail_on_increase(&self, fail: bool) {
        self.state.write().await.fail_on_increase = fail;
    }

    /// Returns the current stock of a product.
    pub async fn stock_of(&self, id: &ProductId) -> Option<u32> {
        self.state
            .read()
            .await
            .products
            .get(id)
            .map(|product| product.stock)
    }

    /// Removes a product entirely.
    pub async fn remove_product(&self, id: &ProductId) {
        self.state.write().await.products.remove(id);
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>> {
        let state = self.state.read().await;
        Ok(state.products.get(id).cloned())
    }

    async fn get_products(&self, ids: &[ProductId]) -> Result<Vec<Product>> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.products.get(id).cloned())
            .collect())
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        let state = self.state.read().await;
        let mut products: Vec<_> = state.products.values().cloned().collect();
        products.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        Ok(products)
    }

    async fn upsert_product(&self, product: &Product) -> Result<()> {
        let mut state = self.state.write().await;
        state.products.insert(product.id.clone(), product.clone());
        Ok(())
    }

    async fn decrease_stock(&self, id: &ProductId, quantity: u32) -> Result<bool> {
        let mut state = self.state.write().await;

        if state.fail_on_decrease || state.faulted_decreases.contains(id) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }

        if state.denied_decreases.contains(id) {
            return Ok(false);
        }

        match state.products.get_mut(id) {
            Some(product) if product.stock >= quantity => {
                product.stock -= quantity;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn increase_stock(&self, id: &ProductId, quantity: u32) -> Result<bool> {
        let mut state = self.state.write().await;

        if state.fail_on_increase {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }

        match state.products.get_mut(id) {
            Some(product) => {
                product.stock += quantity;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// In-memory order store.
#[derive(Clone, Default)]
pub struct InMemoryOrders {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryOrders {
    /// Creates a new empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrders {
    async fn get(&self, id: &OrderId) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.get(id).cloned())
    }

    async fn insert(&self, order: &Order) -> Result<()> {
        let mut orders = self.orders.write().await;
        orders.insert(order.id().clone(), order.clone());
        Ok(())
    }

    async fn update(&self, order: &Order) -> Result<u64> {
        let mut orders = self.orders.write().await;

        let expected = order.version();
        let actual = orders.get(order.id()).map(|stored| stored.version());
        match actual {
            Some(actual) if actual == expected => {
                let new_version = expected + 1;
                let mut persisted = order.clone();
                persisted.set_version(new_version);
                orders.insert(order.id().clone(), persisted);
                Ok(new_version)
            }
            _ => Err(StoreError::VersionConflict {
                order_id: order.id().clone(),
                expected,
                actual: actual.unwrap_or(0),
            }),
        }
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut result: Vec<_> = orders
            .values()
            .filter(|order| order.user_id() == user_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| a.id().as_str().cmp(b.id().as_str()))
        });
        Ok(result)
    }
}
