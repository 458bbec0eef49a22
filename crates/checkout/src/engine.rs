//! Order lifecycle engine.

use chrono::Utc;
use common::OrderId;
use domain::{CartItem, Order, OrderError, OrderStatus, ProductId, ReceiveInfo};
use store::{CatalogStore, OrderStore};

use crate::context::Caller;
use crate::error::{CheckoutError, Result};
use crate::ledger::StockLedger;
use crate::pricing::price_cart;

/// Drives orders from creation through confirmation to terminal states.
///
/// Stock moves strictly sequentially in line-item order, and every error
/// return is preceded by synchronous compensation of whatever this call
/// already applied, so no request leaves the system partially
/// decremented. Persistence goes through the order store's version
/// guard, which makes exactly one of two racing writers win.
pub struct CheckoutEngine<C, O>
where
    C: CatalogStore,
    O: OrderStore,
{
    catalog: C,
    ledger: StockLedger<C>,
    orders: O,
}

impl<C, O> CheckoutEngine<C, O>
where
    C: CatalogStore + Clone,
    O: OrderStore,
{
    /// Creates a new engine over the given stores.
    pub fn new(catalog: C, orders: O) -> Self {
        let ledger = StockLedger::new(catalog.clone());
        Self {
            catalog,
            ledger,
            orders,
        }
    }

    /// Creates a pending order from a requested cart.
    ///
    /// No stock is read or moved here; stock commits at confirmation.
    #[tracing::instrument(skip(self, caller, cart, payment_method, receive_info), fields(user_id = %caller.user_id))]
    pub async fn create_order(
        &self,
        caller: &Caller,
        cart: &[CartItem],
        payment_method: Option<String>,
        receive_info: Option<ReceiveInfo>,
    ) -> Result<Order> {
        let items = price_cart(&self.catalog, cart).await?;
        let order = Order::new(
            caller.user_id,
            items,
            payment_method,
            receive_info,
            Utc::now(),
        );
        self.orders.insert(&order).await?;

        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(order_id = %order.id(), total = %order.total_amount(), "order created");
        Ok(order)
    }

    /// Confirms a pending order, committing its stock exactly once.
    ///
    /// Availability is checked for every line before anything moves; only
    /// then are the decrements applied, one line at a time. A refusal or
    /// fault mid-batch rolls back the decrements already applied by this
    /// call, and losing the persist race does the same, so a failed
    /// confirmation never leaves a stock trace.
    #[tracing::instrument(skip(self, caller, receive_info, payment_method), fields(user_id = %caller.user_id))]
    pub async fn confirm_order(
        &self,
        caller: &Caller,
        order_id: &OrderId,
        receive_info: ReceiveInfo,
        payment_method: String,
    ) -> Result<Order> {
        let start = std::time::Instant::now();

        // Request shape first: no store access for an unusable request.
        receive_info.validate()?;
        if payment_method.trim().is_empty() {
            return Err(OrderError::MissingPaymentMethod.into());
        }

        let mut order = self.load_order(order_id).await?;
        if !caller.can_act_on(order.user_id()) {
            return Err(CheckoutError::Forbidden);
        }
        order.ensure_confirmable()?;
        if !order.has_items() {
            return Err(OrderError::NoItems.into());
        }

        // First pass: every line must look coverable before any decrement.
        for item in order.items() {
            if !self
                .ledger
                .check_available(&item.product_id, item.quantity)
                .await?
            {
                return Err(CheckoutError::InsufficientStock(item.product_id.clone()));
            }
        }

        // Second pass: take stock line by line, tracking what was applied.
        let mut applied: Vec<(ProductId, u32)> = Vec::with_capacity(order.item_count());
        for item in order.items() {
            match self.ledger.decrease(&item.product_id, item.quantity).await {
                Ok(true) => applied.push((item.product_id.clone(), item.quantity)),
                Ok(false) => {
                    // Stock moved between the check and this decrement.
                    self.ledger.rollback_decrements(&applied).await;
                    return Err(CheckoutError::InsufficientStock(item.product_id.clone()));
                }
                Err(error) => {
                    self.ledger.rollback_decrements(&applied).await;
                    return Err(error.into());
                }
            }
        }

        if let Err(error) = order.confirm(receive_info, payment_method, Utc::now()) {
            self.ledger.rollback_decrements(&applied).await;
            return Err(error.into());
        }

        // The version guard picks the winner of a double confirmation;
        // the loser undoes its decrements.
        match self.orders.update(&order).await {
            Ok(version) => order.set_version(version),
            Err(error) => {
                self.ledger.rollback_decrements(&applied).await;
                return Err(error.into());
            }
        }

        metrics::counter!("orders_confirmed_total").increment(1);
        metrics::histogram!("checkout_confirm_duration_seconds")
            .record(start.elapsed().as_secs_f64());
        tracing::info!(total = %order.total_amount(), "order confirmed");
        Ok(order)
    }

    /// Replaces the cart of a pending order with freshly priced items.
    ///
    /// Only the owner may edit a cart; an admin editing someone else's
    /// cart is refused too. A pending order holds no committed stock, so
    /// the edit moves none; each line's demand beyond the old quantity is
    /// checked against current stock so the edit cannot admit a cart the
    /// next confirmation has no chance of covering.
    #[tracing::instrument(skip(self, caller, cart, receive_info), fields(user_id = %caller.user_id))]
    pub async fn update_order(
        &self,
        caller: &Caller,
        order_id: &OrderId,
        cart: &[CartItem],
        receive_info: Option<ReceiveInfo>,
    ) -> Result<Order> {
        let mut order = self.load_order(order_id).await?;
        if !caller.owns(order.user_id()) {
            return Err(CheckoutError::Forbidden);
        }
        order.ensure_items_modifiable()?;

        let items = price_cart(&self.catalog, cart).await?;

        // Net-delta admission: only the demand beyond the old quantity
        // has to be coverable right now.
        for item in &items {
            let old = order.item_quantity(&item.product_id).unwrap_or(0);
            let additional = item.quantity.saturating_sub(old);
            if additional > 0
                && !self
                    .ledger
                    .check_available(&item.product_id, additional)
                    .await?
            {
                return Err(CheckoutError::InsufficientStock(item.product_id.clone()));
            }
        }

        order.replace_items(items, Utc::now())?;
        if let Some(info) = receive_info {
            order.update_receive_info(info)?;
        }

        let version = self.orders.update(&order).await?;
        order.set_version(version);

        tracing::info!(total = %order.total_amount(), "order updated");
        Ok(order)
    }

    /// Advances an order one step along the fulfillment sequence.
    ///
    /// Admin-only. Stock was committed at confirmation, so this is a pure
    /// status transition.
    #[tracing::instrument(skip(self, caller), fields(user_id = %caller.user_id))]
    pub async fn update_status(
        &self,
        caller: &Caller,
        order_id: &OrderId,
        new_status: OrderStatus,
    ) -> Result<Order> {
        if !caller.admin {
            return Err(CheckoutError::Forbidden);
        }

        let mut order = self.load_order(order_id).await?;
        order.advance_status(new_status, Utc::now())?;

        let version = self.orders.update(&order).await?;
        order.set_version(version);

        tracing::info!(status = %order.status(), "order status advanced");
        Ok(order)
    }

    /// Cancels an order, restoring committed stock afterwards.
    ///
    /// The cancellation is persisted before any stock is touched; the
    /// version guard then makes sure only one writer restores stock for
    /// the order. Restoration skips products that no longer exist and
    /// surfaces store faults after logging and counting them, with the
    /// order staying cancelled either way.
    #[tracing::instrument(skip(self, caller), fields(user_id = %caller.user_id))]
    pub async fn cancel_order(&self, caller: &Caller, order_id: &OrderId) -> Result<Order> {
        let mut order = self.load_order(order_id).await?;
        if !caller.can_act_on(order.user_id()) {
            return Err(CheckoutError::Forbidden);
        }

        let held_stock = order.status().stock_committed();
        order.cancel(Utc::now())?;

        let version = self.orders.update(&order).await?;
        order.set_version(version);

        metrics::counter!("orders_cancelled_total").increment(1);
        tracing::info!(restoring_stock = held_stock, "order cancelled");

        if held_stock {
            self.ledger.restore_items(order.items()).await?;
        }

        Ok(order)
    }

    /// Fetches one order, enforcing ownership.
    pub async fn get_order(&self, caller: &Caller, order_id: &OrderId) -> Result<Order> {
        let order = self.load_order(order_id).await?;
        if !caller.can_act_on(order.user_id()) {
            return Err(CheckoutError::Forbidden);
        }
        Ok(order)
    }

    /// Lists the caller's orders, most recently touched first.
    pub async fn list_orders(&self, caller: &Caller) -> Result<Vec<Order>> {
        Ok(self.orders.list_by_user(caller.user_id).await?)
    }

    async fn load_order(&self, order_id: &OrderId) -> Result<Order> {
        self.orders
            .get(order_id)
            .await?
            .ok_or_else(|| CheckoutError::OrderNotFound(order_id.clone()))
    }
}
