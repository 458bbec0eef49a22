//! Order lifecycle endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use checkout::CheckoutEngine;
use common::OrderId;
use domain::{CartItem, Order, OrderStatus, ReceiveInfo};
use serde::{Deserialize, Serialize};
use store::{CatalogStore, OrderStore};

use crate::error::ApiError;
use crate::identity::Identity;

/// Shared application state accessible from all handlers.
pub struct AppState<C: CatalogStore, O: OrderStore> {
    pub engine: CheckoutEngine<C, O>,
    pub catalog: C,
}

// -- Request types --

#[derive(Deserialize)]
pub struct CartItemRequest {
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<CartItemRequest>,
    pub payment_method: Option<String>,
    pub receive_info: Option<ReceiveInfo>,
}

#[derive(Deserialize)]
pub struct ConfirmOrderRequest {
    pub receive_info: ReceiveInfo,
    pub payment_method: String,
}

#[derive(Deserialize)]
pub struct UpdateOrderRequest {
    pub items: Vec<CartItemRequest>,
    pub receive_info: Option<ReceiveInfo>,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub user_id: String,
    pub status: String,
    pub items: Vec<OrderItemResponse>,
    pub total_cents: i64,
    pub payment_method: Option<String>,
    pub receive_info: Option<ReceiveInfo>,
    pub created_at: String,
    pub version: u64,
}

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        let items = order
            .items()
            .iter()
            .map(|item| OrderItemResponse {
                product_id: item.product_id.to_string(),
                product_name: item.product_name.clone(),
                quantity: item.quantity,
                unit_price_cents: item.unit_price.cents(),
                line_total_cents: item.line_total().cents(),
            })
            .collect();

        Self {
            id: order.id().to_string(),
            user_id: order.user_id().to_string(),
            status: order.status().to_string(),
            items,
            total_cents: order.total_amount().cents(),
            payment_method: order.payment_method().map(String::from),
            receive_info: order.receive_info().cloned(),
            created_at: order.created_at().to_rfc3339(),
            version: order.version(),
        }
    }
}

fn to_cart(items: &[CartItemRequest]) -> Vec<CartItem> {
    items
        .iter()
        .map(|item| CartItem::new(item.product_id.as_str(), item.quantity))
        .collect()
}

// -- Handlers --

/// POST /orders — price the cart and persist a new pending order.
#[tracing::instrument(skip(state, identity, req))]
pub async fn create<C, O>(
    State(state): State<Arc<AppState<C, O>>>,
    identity: Identity,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError>
where
    C: CatalogStore + Clone + 'static,
    O: OrderStore + 'static,
{
    let cart = to_cart(&req.items);
    let order = state
        .engine
        .create_order(&identity.0, &cart, req.payment_method, req.receive_info)
        .await?;

    Ok((StatusCode::CREATED, Json(OrderResponse::from(&order))))
}

/// GET /orders — list the caller's orders, most recently touched first.
#[tracing::instrument(skip(state, identity))]
pub async fn list<C, O>(
    State(state): State<Arc<AppState<C, O>>>,
    identity: Identity,
) -> Result<Json<Vec<OrderResponse>>, ApiError>
where
    C: CatalogStore + Clone + 'static,
    O: OrderStore + 'static,
{
    let orders = state.engine.list_orders(&identity.0).await?;
    Ok(Json(orders.iter().map(OrderResponse::from).collect()))
}

/// GET /orders/:id — fetch one order (owner or admin).
#[tracing::instrument(skip(state, identity))]
pub async fn get<C, O>(
    State(state): State<Arc<AppState<C, O>>>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError>
where
    C: CatalogStore + Clone + 'static,
    O: OrderStore + 'static,
{
    let order = state
        .engine
        .get_order(&identity.0, &OrderId::from(id))
        .await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// POST /orders/:id/confirm — commit stock and confirm the order.
#[tracing::instrument(skip(state, identity, req))]
pub async fn confirm<C, O>(
    State(state): State<Arc<AppState<C, O>>>,
    identity: Identity,
    Path(id): Path<String>,
    Json(req): Json<ConfirmOrderRequest>,
) -> Result<Json<OrderResponse>, ApiError>
where
    C: CatalogStore + Clone + 'static,
    O: OrderStore + 'static,
{
    let order = state
        .engine
        .confirm_order(
            &identity.0,
            &OrderId::from(id),
            req.receive_info,
            req.payment_method,
        )
        .await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// PUT /orders/:id — replace a pending order's items (owner only).
#[tracing::instrument(skip(state, identity, req))]
pub async fn update<C, O>(
    State(state): State<Arc<AppState<C, O>>>,
    identity: Identity,
    Path(id): Path<String>,
    Json(req): Json<UpdateOrderRequest>,
) -> Result<Json<OrderResponse>, ApiError>
where
    C: CatalogStore + Clone + 'static,
    O: OrderStore + 'static,
{
    let cart = to_cart(&req.items);
    let order = state
        .engine
        .update_order(&identity.0, &OrderId::from(id), &cart, req.receive_info)
        .await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// PUT /orders/:id/status — advance the fulfillment status (admin only).
#[tracing::instrument(skip(state, identity, req))]
pub async fn update_status<C, O>(
    State(state): State<Arc<AppState<C, O>>>,
    identity: Identity,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<OrderResponse>, ApiError>
where
    C: CatalogStore + Clone + 'static,
    O: OrderStore + 'static,
{
    let order = state
        .engine
        .update_status(&identity.0, &OrderId::from(id), req.status)
        .await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// POST /orders/:id/cancel — cancel the order and release committed stock.
#[tracing::instrument(skip(state, identity))]
pub async fn cancel<C, O>(
    State(state): State<Arc<AppState<C, O>>>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError>
where
    C: CatalogStore + Clone + 'static,
    O: OrderStore + 'static,
{
    let order = state
        .engine
        .cancel_order(&identity.0, &OrderId::from(id))
        .await?;
    Ok(Json(OrderResponse::from(&order)))
}
