//! Integration tests for the API server.

use std::sync::OnceLock;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use domain::{Money, Product};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};
use store::{CatalogStore, InMemoryCatalog, InMemoryOrders};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            metrics_exporter_prometheus::PrometheusBuilder::new()
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

async fn seed(catalog: &InMemoryCatalog, id: &str, price_cents: i64, stock: u32) {
    catalog
        .upsert_product(&Product::new(
            id,
            id,
            Money::from_cents(price_cents),
            stock,
            "demo",
        ))
        .await
        .unwrap();
}

/// App over P1 (price 100, stock 5) and P2 (price 50, stock 5), plus the
/// catalog handle for stock assertions.
async fn setup() -> (axum::Router, InMemoryCatalog) {
    let catalog = InMemoryCatalog::new();
    seed(&catalog, "P1", 100, 5).await;
    seed(&catalog, "P2", 50, 5).await;

    let state = api::create_state(catalog.clone(), InMemoryOrders::new());
    let app = api::create_app(state, get_metrics_handle());
    (app, catalog)
}

fn fresh_user() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn get_as(uri: &str, user: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-user-id", user)
        .body(Body::empty())
        .unwrap()
}

fn request_json(method: &str, uri: &str, user: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-user-id", user)
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn canonical_cart() -> Value {
    json!({
        "items": [
            { "product_id": "P1", "quantity": 2 },
            { "product_id": "P2", "quantity": 1 }
        ]
    })
}

fn confirm_body() -> Value {
    json!({
        "receive_info": { "name": "Ada", "phone": "555-0100", "address": "1 Main St" },
        "payment_method": "card"
    })
}

/// Creates the canonical two-item order and returns its response body.
async fn create_order(app: &axum::Router, user: &str) -> Value {
    let response = app
        .clone()
        .oneshot(request_json("POST", "/orders", user, &canonical_cart()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

async fn product_stock(app: &axum::Router, id: &str) -> u64 {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/products/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["stock"].as_u64().unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = setup().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _) = setup().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_missing_identity_rejected() {
    let (app, _) = setup().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/orders")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["category"], "unauthorized");
}

#[tokio::test]
async fn test_invalid_identity_rejected() {
    let (app, _) = setup().await;

    let response = app
        .oneshot(get_as("/orders", "not-a-uuid"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_order() {
    let (app, _) = setup().await;
    let user = fresh_user();

    let order = create_order(&app, &user).await;

    assert_eq!(order["status"], "Pending");
    assert_eq!(order["total_cents"], 250);
    assert_eq!(order["version"], 1);
    assert_eq!(order["user_id"], user);
    assert_eq!(order["items"].as_array().unwrap().len(), 2);
    assert!(order["id"].as_str().is_some());
}

#[tokio::test]
async fn test_create_order_empty_cart() {
    let (app, _) = setup().await;

    let response = app
        .oneshot(request_json(
            "POST",
            "/orders",
            &fresh_user(),
            &json!({ "items": [] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["category"], "validation");
}

#[tokio::test]
async fn test_create_order_unknown_product() {
    let (app, _) = setup().await;

    let response = app
        .oneshot(request_json(
            "POST",
            "/orders",
            &fresh_user(),
            &json!({ "items": [{ "product_id": "P9", "quantity": 1 }] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["category"], "not_found");
}

#[tokio::test]
async fn test_create_and_get_order() {
    let (app, _) = setup().await;
    let user = fresh_user();
    let created = create_order(&app, &user).await;
    let order_id = created["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(get_as(&format!("/orders/{order_id}"), &user))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let order = body_json(response).await;
    assert_eq!(order["id"], order_id);
    assert_eq!(order["total_cents"], 250);

    // Another user's read is refused; an admin's goes through.
    let response = app
        .clone()
        .oneshot(get_as(&format!("/orders/{order_id}"), &fresh_user()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/orders/{order_id}"))
                .header("x-user-id", fresh_user())
                .header("x-admin", "true")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_get_nonexistent_order() {
    let (app, _) = setup().await;

    let response = app
        .oneshot(get_as("/orders/no-such-order", &fresh_user()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_confirm_flow() {
    let (app, _) = setup().await;
    let user = fresh_user();
    let created = create_order(&app, &user).await;
    let order_id = created["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(request_json(
            "POST",
            &format!("/orders/{order_id}/confirm"),
            &user,
            &confirm_body(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let order = body_json(response).await;
    assert_eq!(order["status"], "Confirmed");
    assert_eq!(order["payment_method"], "card");
    assert_eq!(order["receive_info"]["name"], "Ada");
    assert_eq!(order["version"], 2);

    assert_eq!(product_stock(&app, "P1").await, 3);
    assert_eq!(product_stock(&app, "P2").await, 4);
}

#[tokio::test]
async fn test_confirm_insufficient_stock() {
    let (app, _) = setup().await;
    let user = fresh_user();

    // Creation admits any quantity; the stock check runs at confirmation.
    let response = app
        .clone()
        .oneshot(request_json(
            "POST",
            "/orders",
            &user,
            &json!({ "items": [{ "product_id": "P1", "quantity": 99 }] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let order_id = created["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(request_json(
            "POST",
            &format!("/orders/{order_id}/confirm"),
            &user,
            &confirm_body(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["category"], "insufficient_stock");
    assert_eq!(product_stock(&app, "P1").await, 5);
}

#[tokio::test]
async fn test_confirm_requires_complete_receive_info() {
    let (app, _) = setup().await;
    let user = fresh_user();
    let created = create_order(&app, &user).await;
    let order_id = created["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(request_json(
            "POST",
            &format!("/orders/{order_id}/confirm"),
            &user,
            &json!({
                "receive_info": { "name": "Ada", "phone": "  ", "address": "1 Main St" },
                "payment_method": "card"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["category"], "validation");
}

#[tokio::test]
async fn test_double_confirm_conflicts() {
    let (app, _) = setup().await;
    let user = fresh_user();
    let created = create_order(&app, &user).await;
    let order_id = created["id"].as_str().unwrap();

    let confirm = request_json(
        "POST",
        &format!("/orders/{order_id}/confirm"),
        &user,
        &confirm_body(),
    );
    let response = app.clone().oneshot(confirm).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let again = request_json(
        "POST",
        &format!("/orders/{order_id}/confirm"),
        &user,
        &confirm_body(),
    );
    let response = app.clone().oneshot(again).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["category"], "conflict");

    // Stock committed exactly once.
    assert_eq!(product_stock(&app, "P1").await, 3);
    assert_eq!(product_stock(&app, "P2").await, 4);
}

#[tokio::test]
async fn test_update_order() {
    let (app, _) = setup().await;
    let user = fresh_user();
    let created = create_order(&app, &user).await;
    let order_id = created["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(request_json(
            "PUT",
            &format!("/orders/{order_id}"),
            &user,
            &json!({ "items": [{ "product_id": "P1", "quantity": 3 }] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let order = body_json(response).await;
    assert_eq!(order["total_cents"], 300);
    assert_eq!(order["items"].as_array().unwrap().len(), 1);
    assert_eq!(order["version"], 2);

    // Pending edits move no stock.
    assert_eq!(product_stock(&app, "P1").await, 5);
}

#[tokio::test]
async fn test_update_order_is_owner_only() {
    let (app, _) = setup().await;
    let user = fresh_user();
    let created = create_order(&app, &user).await;
    let order_id = created["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(request_json(
            "PUT",
            &format!("/orders/{order_id}"),
            &fresh_user(),
            &json!({ "items": [{ "product_id": "P1", "quantity": 1 }] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_update_status_requires_admin() {
    let (app, _) = setup().await;
    let user = fresh_user();
    let created = create_order(&app, &user).await;
    let order_id = created["id"].as_str().unwrap();

    let confirm = request_json(
        "POST",
        &format!("/orders/{order_id}/confirm"),
        &user,
        &confirm_body(),
    );
    assert_eq!(app.clone().oneshot(confirm).await.unwrap().status(), StatusCode::OK);

    // The owner is not staff.
    let response = app
        .clone()
        .oneshot(request_json(
            "PUT",
            &format!("/orders/{order_id}/status"),
            &user,
            &json!({ "status": "Processing" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/orders/{order_id}/status"))
                .header("content-type", "application/json")
                .header("x-user-id", fresh_user())
                .header("x-admin", "true")
                .body(Body::from(json!({ "status": "Processing" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let order = body_json(response).await;
    assert_eq!(order["status"], "Processing");
}

#[tokio::test]
async fn test_update_status_rejects_unknown_name() {
    let (app, _) = setup().await;
    let user = fresh_user();
    let created = create_order(&app, &user).await;
    let order_id = created["id"].as_str().unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/orders/{order_id}/status"))
                .header("content-type", "application/json")
                .header("x-user-id", fresh_user())
                .header("x-admin", "true")
                .body(Body::from(json!({ "status": "Bogus" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_cancel_restores_stock() {
    let (app, _) = setup().await;
    let user = fresh_user();
    let created = create_order(&app, &user).await;
    let order_id = created["id"].as_str().unwrap();

    let confirm = request_json(
        "POST",
        &format!("/orders/{order_id}/confirm"),
        &user,
        &confirm_body(),
    );
    assert_eq!(app.clone().oneshot(confirm).await.unwrap().status(), StatusCode::OK);
    assert_eq!(product_stock(&app, "P1").await, 3);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/orders/{order_id}/cancel"))
                .header("x-user-id", &user)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let order = body_json(response).await;
    assert_eq!(order["status"], "Cancelled");

    assert_eq!(product_stock(&app, "P1").await, 5);
    assert_eq!(product_stock(&app, "P2").await, 5);
}

#[tokio::test]
async fn test_list_orders_scoped_to_caller() {
    let (app, _) = setup().await;
    let alice = fresh_user();
    let bob = fresh_user();
    create_order(&app, &alice).await;
    create_order(&app, &bob).await;

    let response = app.clone().oneshot(get_as("/orders", &alice)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let orders = body_json(response).await;
    let orders = orders.as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["user_id"], alice);
}

#[tokio::test]
async fn test_product_listing_and_rating() {
    let (app, catalog) = setup().await;

    let mut rated = Product::new("P3", "Rated", Money::from_cents(700), 9, "demo");
    rated.rating.insert(5, 2);
    rated.rating.insert(3, 1);
    catalog.upsert_product(&rated).await.unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/products")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let products = body_json(response).await;
    assert_eq!(products.as_array().unwrap().len(), 3);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/products/P3")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let product = body_json(response).await;
    assert_eq!(product["unit_price_cents"], 700);
    assert_eq!(product["stock"], 9);
    let rating = product["average_rating"].as_f64().unwrap();
    assert!((rating - 4.3).abs() < 1e-3);
}

#[tokio::test]
async fn test_missing_product_not_found() {
    let (app, _) = setup().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/products/ghost")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["category"], "not_found");
}
