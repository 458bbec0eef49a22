//! Order confirmation and stock reservation core.
//!
//! Carts are priced into immutable line items, pending orders confirm by
//! committing stock through atomic ledger decrements, and any partial
//! failure is compensated before the error returns. Cancellation
//! restores what confirmation took. The engine owns the lifecycle; the
//! ledger owns the stock movements; both are generic over the storage
//! traits.

pub mod context;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod pricing;

pub use context::Caller;
pub use engine::CheckoutEngine;
pub use error::{CheckoutError, ErrorCategory, Result};
pub use ledger::StockLedger;
pub use pricing::price_cart;
