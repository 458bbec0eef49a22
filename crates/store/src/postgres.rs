use std::collections::BTreeMap;

use async_trait::async_trait;
use common::OrderId;
use domain::{Money, Order, Product, ProductId, UserId};
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::{CatalogStore, OrderStore, Result, StoreError};

/// PostgreSQL-backed implementation of both stores.
///
/// Products live in a plain row table whose stock column only moves through
/// conditional updates; orders are stored as a JSON document next to an
/// authoritative version column.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_product(row: PgRow) -> Result<Product> {
        let rating_json: serde_json::Value = row.try_get("rating")?;
        let rating: BTreeMap<u8, u32> = serde_json::from_value(rating_json)?;

        Ok(Product {
            id: ProductId::new(row.try_get::<String, _>("id")?),
            name: row.try_get("name")?,
            unit_price: Money::from_cents(row.try_get("unit_price")?),
            stock: row.try_get::<i64, _>("stock")? as u32,
            category: row.try_get("category")?,
            rating,
        })
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let doc: serde_json::Value = row.try_get("doc")?;
        let mut order: Order = serde_json::from_value(doc)?;

        // The version column is authoritative, whatever the document says.
        order.set_version(row.try_get::<i64, _>("version")? as u64);
        Ok(order)
    }
}

#[async_trait]
impl CatalogStore for PostgresStore {
    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, unit_price, stock, category, rating
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_product).transpose()
    }

    async fn get_products(&self, ids: &[ProductId]) -> Result<Vec<Product>> {
        let ids: Vec<String> = ids.iter().map(|id| id.as_str().to_string()).collect();

        let rows = sqlx::query(
            r#"
            SELECT id, name, unit_price, stock, category, rating
            FROM products
            WHERE id = ANY($1)
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_product).collect()
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, unit_price, stock, category, rating
            FROM products
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_product).collect()
    }

    async fn upsert_product(&self, product: &Product) -> Result<()> {
        let rating = serde_json::to_value(&product.rating)?;

        sqlx::query(
            r#"
            INSERT INTO products (id, name, unit_price, stock, category, rating)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                unit_price = EXCLUDED.unit_price,
                stock = EXCLUDED.stock,
                category = EXCLUDED.category,
                rating = EXCLUDED.rating
            "#,
        )
        .bind(product.id.as_str())
        .bind(&product.name)
        .bind(product.unit_price.cents())
        .bind(product.stock as i64)
        .bind(&product.category)
        .bind(rating)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn decrease_stock(&self, id: &ProductId, quantity: u32) -> Result<bool> {
        // The availability check and the decrement are one statement, so two
        // confirmations racing for the last units cannot both win.
        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock - $2
            WHERE id = $1 AND stock >= $2
            "#,
        )
        .bind(id.as_str())
        .bind(quantity as i64)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn increase_stock(&self, id: &ProductId, quantity: u32) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock + $2
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .bind(quantity as i64)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl OrderStore for PostgresStore {
    async fn get(&self, id: &OrderId) -> Result<Option<Order>> {
        let row = sqlx::query(
            r#"
            SELECT doc, version
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn insert(&self, order: &Order) -> Result<()> {
        let doc = serde_json::to_value(order)?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, user_id, doc, version, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(order.id().as_str())
        .bind(order.user_id().as_uuid())
        .bind(doc)
        .bind(order.version() as i64)
        .bind(order.created_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, order: &Order) -> Result<u64> {
        let expected = order.version();
        let new_version = expected + 1;

        let mut persisted = order.clone();
        persisted.set_version(new_version);
        let doc = serde_json::to_value(&persisted)?;

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET doc = $2, version = $3, created_at = $4
            WHERE id = $1 AND version = $5
            "#,
        )
        .bind(order.id().as_str())
        .bind(doc)
        .bind(new_version as i64)
        .bind(order.created_at())
        .bind(expected as i64)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let actual: Option<i64> = sqlx::query_scalar("SELECT version FROM orders WHERE id = $1")
                .bind(order.id().as_str())
                .fetch_optional(&self.pool)
                .await?;
            let actual = actual.unwrap_or(0) as u64;

            tracing::debug!(order_id = %order.id(), expected, actual, "order update lost version race");
            return Err(StoreError::VersionConflict {
                order_id: order.id().clone(),
                expected,
                actual,
            });
        }

        Ok(new_version)
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        let rows = sqlx::query(
            r#"
            SELECT doc, version
            FROM orders
            WHERE user_id = $1
            ORDER BY created_at DESC, id ASC
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }
}
