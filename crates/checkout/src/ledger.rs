//! Stock ledger over the catalog store.

use domain::{LineItem, ProductId};
use store::CatalogStore;

use crate::error::Result;

/// Batch-aware stock movements for the order lifecycle.
///
/// Every movement goes through the catalog store's atomic operations;
/// the ledger holds no stock state of its own. What it adds is the
/// compensation protocol: reversing a partially applied batch and
/// restoring a cancelled order's items, with failures logged and counted
/// for manual reconciliation instead of being swallowed.
pub struct StockLedger<C: CatalogStore> {
    catalog: C,
}

impl<C: CatalogStore> StockLedger<C> {
    /// Creates a ledger over the given catalog store.
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    /// Returns true if current stock covers `quantity`.
    ///
    /// A missing product counts as unavailable. The answer can go stale
    /// before a paired decrease runs; only `decrease` decides.
    pub async fn check_available(&self, product_id: &ProductId, quantity: u32) -> Result<bool> {
        let product = self.catalog.get_product(product_id).await?;
        Ok(product.is_some_and(|p| p.stock >= quantity))
    }

    /// Atomically takes `quantity` units.
    ///
    /// Returns `Ok(false)` without any change when stock is short or the
    /// product is gone.
    pub async fn decrease(&self, product_id: &ProductId, quantity: u32) -> Result<bool> {
        let taken = self.catalog.decrease_stock(product_id, quantity).await?;
        if taken {
            metrics::counter!("stock_decrements_total").increment(1);
        }
        Ok(taken)
    }

    /// Returns `quantity` units to stock.
    pub async fn increase(&self, product_id: &ProductId, quantity: u32) -> Result<bool> {
        Ok(self.catalog.increase_stock(product_id, quantity).await?)
    }

    /// Reverses a partially applied batch of decrements, newest first.
    ///
    /// Called on the error path, so nothing is propagated from here: a
    /// product that cannot be restored is logged and counted, and the
    /// remaining items are still attempted.
    pub async fn rollback_decrements(&self, applied: &[(ProductId, u32)]) {
        if applied.is_empty() {
            return;
        }

        for (product_id, quantity) in applied.iter().rev() {
            match self.catalog.increase_stock(product_id, *quantity).await {
                Ok(true) => {}
                Ok(false) => {
                    metrics::counter!("stock_reconciliation_failures_total").increment(1);
                    tracing::warn!(%product_id, quantity, "rollback target no longer exists");
                }
                Err(error) => {
                    metrics::counter!("stock_reconciliation_failures_total").increment(1);
                    tracing::error!(%product_id, quantity, %error, "stock rollback failed");
                }
            }
        }

        metrics::counter!("stock_rollbacks_total").increment(1);
    }

    /// Restores every line item's quantity to stock.
    ///
    /// A product that no longer exists is logged and skipped. A store
    /// fault is counted and surfaced; items after the faulting one are
    /// left unrestored, which the log records.
    pub async fn restore_items(&self, items: &[LineItem]) -> Result<()> {
        for item in items {
            match self
                .catalog
                .increase_stock(&item.product_id, item.quantity)
                .await
            {
                Ok(true) => {}
                Ok(false) => {
                    tracing::warn!(
                        product_id = %item.product_id,
                        quantity = item.quantity,
                        "product gone, skipping stock restoration"
                    );
                }
                Err(error) => {
                    metrics::counter!("stock_reconciliation_failures_total").increment(1);
                    tracing::error!(
                        product_id = %item.product_id,
                        quantity = item.quantity,
                        %error,
                        "stock restoration failed"
                    );
                    return Err(error.into());
                }
            }
        }
        Ok(())
    }
}
