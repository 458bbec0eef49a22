//! HTTP surface for the checkout engine and product catalog.
//!
//! REST endpoints for the order lifecycle and the read-only catalog,
//! with structured logging (tracing) and Prometheus metrics. Identity
//! arrives pre-verified from the upstream auth layer as request headers.

pub mod config;
pub mod error;
pub mod identity;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use checkout::CheckoutEngine;
use metrics_exporter_prometheus::PrometheusHandle;
use store::{CatalogStore, OrderStore};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<C, O>(state: Arc<AppState<C, O>>, metrics_handle: PrometheusHandle) -> Router
where
    C: CatalogStore + Clone + 'static,
    O: OrderStore + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders", post(routes::orders::create::<C, O>))
        .route("/orders", get(routes::orders::list::<C, O>))
        .route("/orders/{id}", get(routes::orders::get::<C, O>))
        .route("/orders/{id}", put(routes::orders::update::<C, O>))
        .route("/orders/{id}/confirm", post(routes::orders::confirm::<C, O>))
        .route(
            "/orders/{id}/status",
            put(routes::orders::update_status::<C, O>),
        )
        .route("/orders/{id}/cancel", post(routes::orders::cancel::<C, O>))
        .route("/products", get(routes::products::list::<C, O>))
        .route("/products/{id}", get(routes::products::get::<C, O>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Builds the shared application state over a catalog and an order store.
pub fn create_state<C, O>(catalog: C, orders: O) -> Arc<AppState<C, O>>
where
    C: CatalogStore + Clone + 'static,
    O: OrderStore + 'static,
{
    Arc::new(AppState {
        engine: CheckoutEngine::new(catalog.clone(), orders),
        catalog,
    })
}
