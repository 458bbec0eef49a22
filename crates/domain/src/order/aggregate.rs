//! Order aggregate implementation.

use chrono::{DateTime, Utc};
use common::OrderId;
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::product::ProductId;

use super::{LineItem, OrderError, OrderStatus, ReceiveInfo, UserId};

/// Order aggregate root.
///
/// Holds the ordered line items, the derived total, and the lifecycle
/// status. Every mutating method guards on the current status before
/// changing anything and recomputes the total afterwards, so
/// `total_amount` always equals the sum of the line totals.
///
/// The version field carries the optimistic concurrency token; the order
/// store refuses an update whose version does not match the stored one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Unique order identifier.
    id: OrderId,

    /// User who placed the order.
    user_id: UserId,

    /// Line items in cart order.
    items: Vec<LineItem>,

    /// Derived sum of all line totals.
    total_amount: Money,

    /// Current lifecycle status.
    status: OrderStatus,

    /// Chosen payment method, required by confirmation.
    payment_method: Option<String>,

    /// Delivery details, required by confirmation.
    receive_info: Option<ReceiveInfo>,

    /// Last status-affecting mutation time.
    created_at: DateTime<Utc>,

    /// Version for optimistic concurrency.
    #[serde(default)]
    version: u64,
}

impl Order {
    /// Creates a new pending order from priced line items.
    pub fn new(
        user_id: UserId,
        items: Vec<LineItem>,
        payment_method: Option<String>,
        receive_info: Option<ReceiveInfo>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut order = Self {
            id: OrderId::new(),
            user_id,
            items,
            total_amount: Money::zero(),
            status: OrderStatus::Pending,
            payment_method,
            receive_info,
            created_at: now,
            version: 1,
        };
        order.recompute_total();
        order
    }
}

// Query methods
impl Order {
    /// Returns the order ID.
    pub fn id(&self) -> &OrderId {
        &self.id
    }

    /// Returns the owning user's ID.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the line items in cart order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Returns the quantity currently ordered for a product, if present.
    pub fn item_quantity(&self, product_id: &ProductId) -> Option<u32> {
        self.items
            .iter()
            .find(|item| &item.product_id == product_id)
            .map(|item| item.quantity)
    }

    /// Returns the number of lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the total quantity across all lines.
    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Returns the derived total amount.
    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    /// Returns the current status.
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Returns the payment method, if set.
    pub fn payment_method(&self) -> Option<&str> {
        self.payment_method.as_deref()
    }

    /// Returns the receive info, if set.
    pub fn receive_info(&self) -> Option<&ReceiveInfo> {
        self.receive_info.as_ref()
    }

    /// Returns the last status-affecting mutation time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the optimistic concurrency version.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Returns true if the order has line items.
    pub fn has_items(&self) -> bool {
        !self.items.is_empty()
    }

    /// Returns true if the order is in a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

// Command methods
impl Order {
    /// Checks that the order may be confirmed in its current status.
    ///
    /// Distinguishes an order that was already confirmed from one that was
    /// cancelled, so callers can report the right outcome.
    pub fn ensure_confirmable(&self) -> Result<(), OrderError> {
        match self.status {
            OrderStatus::Pending => Ok(()),
            OrderStatus::Cancelled => Err(OrderError::InvalidStatus {
                status: self.status,
                action: "confirm",
            }),
            _ => Err(OrderError::AlreadyConfirmed),
        }
    }

    /// Confirms the order, assigning delivery details and payment method.
    ///
    /// Requires a pending order with items, non-blank receive info fields
    /// and a non-blank payment method. Stock movement is the caller's
    /// responsibility; this method only transitions the aggregate.
    pub fn confirm(
        &mut self,
        receive_info: ReceiveInfo,
        payment_method: String,
        now: DateTime<Utc>,
    ) -> Result<(), OrderError> {
        self.ensure_confirmable()?;

        if !self.has_items() {
            return Err(OrderError::NoItems);
        }

        receive_info.validate()?;
        if payment_method.trim().is_empty() {
            return Err(OrderError::MissingPaymentMethod);
        }

        self.receive_info = Some(receive_info);
        self.payment_method = Some(payment_method);
        self.status = OrderStatus::Confirmed;
        self.created_at = now;
        self.recompute_total();
        Ok(())
    }

    /// Checks that the order's items may still be edited.
    pub fn ensure_items_modifiable(&self) -> Result<(), OrderError> {
        if !self.status.can_modify_items() {
            return Err(OrderError::InvalidStatus {
                status: self.status,
                action: "modify items of",
            });
        }
        Ok(())
    }

    /// Replaces the line items of a pending order.
    pub fn replace_items(
        &mut self,
        items: Vec<LineItem>,
        now: DateTime<Utc>,
    ) -> Result<(), OrderError> {
        self.ensure_items_modifiable()?;

        if items.is_empty() {
            return Err(OrderError::NoItems);
        }

        self.items = items;
        self.created_at = now;
        self.recompute_total();
        Ok(())
    }

    /// Replaces the delivery details.
    pub fn update_receive_info(&mut self, receive_info: ReceiveInfo) -> Result<(), OrderError> {
        receive_info.validate()?;
        self.receive_info = Some(receive_info);
        Ok(())
    }

    /// Advances the order one step along the fulfillment sequence.
    ///
    /// Only the immediate forward successor is accepted.
    pub fn advance_status(
        &mut self,
        to: OrderStatus,
        now: DateTime<Utc>,
    ) -> Result<(), OrderError> {
        match self.status.next_forward() {
            Some(next) if next == to => {
                self.status = to;
                self.created_at = now;
                Ok(())
            }
            _ => Err(OrderError::InvalidTransition {
                from: self.status,
                to,
            }),
        }
    }

    /// Cancels the order.
    ///
    /// Stock restoration for confirmed orders is the caller's
    /// responsibility; this method only transitions the aggregate.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<(), OrderError> {
        if !self.status.can_cancel() {
            return Err(OrderError::InvalidStatus {
                status: self.status,
                action: "cancel",
            });
        }

        self.status = OrderStatus::Cancelled;
        self.created_at = now;
        Ok(())
    }

    /// Sets the optimistic concurrency version after a successful persist.
    pub fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    fn recompute_total(&mut self) {
        self.total_amount = self
            .items
            .iter()
            .fold(Money::zero(), |total, item| total + item.line_total());
    }
}
