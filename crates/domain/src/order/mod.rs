//! Order aggregate and related types.

mod aggregate;
mod status;
mod value_objects;

pub use aggregate::Order;
pub use status::OrderStatus;
pub use value_objects::{CartItem, LineItem, ReceiveInfo, UserId};

use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Confirmation was attempted on an already confirmed order.
    #[error("Order has already been confirmed")]
    AlreadyConfirmed,

    /// Order is not in a status that permits the action.
    #[error("Cannot {action} an order in {status} status")]
    InvalidStatus {
        status: OrderStatus,
        action: &'static str,
    },

    /// Status change is not the immediate forward step.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// Order has no items.
    #[error("Order has no items")]
    NoItems,

    /// A receive info field is blank.
    #[error("Receive info field '{field}' must not be blank")]
    BlankReceiveField { field: &'static str },

    /// Payment method is blank.
    #[error("Payment method must not be blank")]
    MissingPaymentMethod,
}
