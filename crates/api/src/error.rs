//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use checkout::{CheckoutError, ErrorCategory};

/// API-level error type that maps to HTTP responses.
///
/// Every error renders as `{"error": …, "category": …}` so clients can
/// branch on the category without parsing messages.
#[derive(Debug)]
pub enum ApiError {
    /// Request rejected before it reached the engine.
    BadRequest(String),
    /// Missing or malformed identity headers.
    Unauthorized(String),
    /// Engine failure carrying its error category.
    Checkout(CheckoutError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, category, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "validation", msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
            ApiError::Checkout(err) => checkout_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message, "category": category });
        (status, axum::Json(body)).into_response()
    }
}

fn checkout_error_to_response(err: CheckoutError) -> (StatusCode, &'static str, String) {
    let category = err.category();
    let status = match category {
        ErrorCategory::Validation => StatusCode::BAD_REQUEST,
        ErrorCategory::NotFound => StatusCode::NOT_FOUND,
        ErrorCategory::Conflict | ErrorCategory::InsufficientStock => StatusCode::CONFLICT,
        ErrorCategory::Fault => {
            tracing::error!(error = %err, "internal error serving request");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, category.as_str(), err.to_string())
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}
