//! Storage layer: catalog and order stores.
//!
//! `CatalogStore` owns product stock movement; its conditional decrement is
//! atomic at the storage layer, which is what keeps concurrent
//! confirmations from overselling. `OrderStore` persists order aggregates
//! behind a version-guarded update. Both traits ship a PostgreSQL
//! implementation and an in-memory implementation with failure toggles for
//! tests.

pub mod catalog;
pub mod error;
pub mod memory;
pub mod orders;
pub mod postgres;

pub use catalog::CatalogStore;
pub use common::OrderId;
pub use error::{Result, StoreError};
pub use memory::{InMemoryCatalog, InMemoryOrders};
pub use orders::OrderStore;
pub use postgres::PostgresStore;
