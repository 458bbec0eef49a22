//! Read-only catalog endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use checkout::CheckoutError;
use domain::{Product, ProductId};
use serde::Serialize;
use store::{CatalogStore, OrderStore};

use crate::error::ApiError;
use crate::routes::orders::AppState;

#[derive(Serialize)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub unit_price_cents: i64,
    pub stock: u32,
    pub category: String,
    pub average_rating: f32,
}

impl From<&Product> for ProductResponse {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            unit_price_cents: product.unit_price.cents(),
            stock: product.stock,
            category: product.category.clone(),
            average_rating: product.average_rating(),
        }
    }
}

/// GET /products — list the catalog with derived average ratings.
#[tracing::instrument(skip(state))]
pub async fn list<C, O>(
    State(state): State<Arc<AppState<C, O>>>,
) -> Result<Json<Vec<ProductResponse>>, ApiError>
where
    C: CatalogStore + Clone + 'static,
    O: OrderStore + 'static,
{
    let products = state
        .catalog
        .list_products()
        .await
        .map_err(CheckoutError::from)?;
    Ok(Json(products.iter().map(ProductResponse::from).collect()))
}

/// GET /products/:id — fetch one catalog item.
#[tracing::instrument(skip(state))]
pub async fn get<C, O>(
    State(state): State<Arc<AppState<C, O>>>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError>
where
    C: CatalogStore + Clone + 'static,
    O: OrderStore + 'static,
{
    let product_id = ProductId::from(id);
    let product = state
        .catalog
        .get_product(&product_id)
        .await
        .map_err(CheckoutError::from)?
        .ok_or_else(|| ApiError::Checkout(CheckoutError::ProductNotFound(product_id)))?;
    Ok(Json(ProductResponse::from(&product)))
}
