//! Domain model for the checkout system.
//!
//! This crate provides the pure domain types:
//! - Order aggregate with its status machine and guarded mutations
//! - Product snapshot with stock count and rating histogram
//! - Money and the order value objects
//!
//! Everything here is synchronous and side-effect free; persistence and
//! stock movement live behind the store crate's traits.

pub mod money;
pub mod order;
pub mod product;

pub use common::OrderId;
pub use money::Money;
pub use order::{CartItem, LineItem, Order, OrderError, OrderStatus, ReceiveInfo, UserId};
pub use product::{Product, ProductId};
