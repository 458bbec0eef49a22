//! Checkout error taxonomy.

use common::OrderId;
use domain::{OrderError, ProductId};
use store::StoreError;
use thiserror::Error;

/// Errors surfaced by checkout operations.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The requested cart has no items.
    #[error("Cart is empty")]
    EmptyCart,

    /// A cart line carries a non-positive quantity.
    #[error("Invalid quantity {quantity} for product {product_id}")]
    InvalidQuantity {
        product_id: ProductId,
        quantity: u32,
    },

    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// Product not found in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// The caller may not act on this order.
    #[error("Caller may not act on this order")]
    Forbidden,

    /// Stock could not cover the requested quantity.
    ///
    /// An expected business outcome, never returned with a net stock
    /// change left behind.
    #[error("Insufficient stock for product {0}")]
    InsufficientStock(ProductId),

    /// The order aggregate rejected the operation.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Storage layer error.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Coarse outcome classes for mapping errors to caller-facing responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad input shape, rejected before any store access.
    Validation,
    /// Order or product does not exist.
    NotFound,
    /// The operation conflicts with the order's current state, its owner,
    /// or a concurrent writer.
    Conflict,
    /// Stock could not cover the request.
    InsufficientStock,
    /// Storage fault with no business meaning.
    Fault,
}

impl ErrorCategory {
    /// Returns the category as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Validation => "validation",
            ErrorCategory::NotFound => "not_found",
            ErrorCategory::Conflict => "conflict",
            ErrorCategory::InsufficientStock => "insufficient_stock",
            ErrorCategory::Fault => "fault",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl CheckoutError {
    /// Classifies the error into its outcome category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            CheckoutError::EmptyCart | CheckoutError::InvalidQuantity { .. } => {
                ErrorCategory::Validation
            }
            CheckoutError::OrderNotFound(_) | CheckoutError::ProductNotFound(_) => {
                ErrorCategory::NotFound
            }
            CheckoutError::Forbidden => ErrorCategory::Conflict,
            CheckoutError::InsufficientStock(_) => ErrorCategory::InsufficientStock,
            CheckoutError::Order(source) => match source {
                OrderError::BlankReceiveField { .. }
                | OrderError::MissingPaymentMethod
                | OrderError::NoItems => ErrorCategory::Validation,
                OrderError::AlreadyConfirmed
                | OrderError::InvalidStatus { .. }
                | OrderError::InvalidTransition { .. } => ErrorCategory::Conflict,
            },
            CheckoutError::Store(StoreError::VersionConflict { .. }) => ErrorCategory::Conflict,
            CheckoutError::Store(_) => ErrorCategory::Fault,
        }
    }
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;
