//! Value objects for the order domain.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::Money;
use crate::product::ProductId;

use super::OrderError;

/// Unique identifier for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random user ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a user ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for UserId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<UserId> for Uuid {
    fn from(id: UserId) -> Self {
        id.0
    }
}

/// A requested product and quantity, before pricing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// The product identifier.
    pub product_id: ProductId,

    /// Requested quantity.
    pub quantity: u32,
}

impl CartItem {
    /// Creates a new cart item.
    pub fn new(product_id: impl Into<ProductId>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// A priced line in an order.
///
/// The unit price is captured from the catalog when the line is built and
/// never changes afterwards, regardless of later catalog price changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// The product identifier.
    pub product_id: ProductId,

    /// Human-readable product name.
    pub product_name: String,

    /// Quantity ordered.
    pub quantity: u32,

    /// Captured price per unit.
    pub unit_price: Money,
}

impl LineItem {
    /// Creates a new line item.
    pub fn new(
        product_id: impl Into<ProductId>,
        product_name: impl Into<String>,
        quantity: u32,
        unit_price: Money,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            product_name: product_name.into(),
            quantity,
            unit_price,
        }
    }

    /// Returns the total price for this line (quantity * unit_price).
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// Delivery contact details required before an order can be confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiveInfo {
    /// Recipient name.
    pub name: String,

    /// Contact phone number.
    pub phone: String,

    /// Delivery address.
    pub address: String,
}

impl ReceiveInfo {
    /// Creates new receive info.
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            address: address.into(),
        }
    }

    /// Rejects receive info with any blank field.
    ///
    /// Whitespace-only values count as blank.
    pub fn validate(&self) -> Result<(), OrderError> {
        if self.name.trim().is_empty() {
            return Err(OrderError::BlankReceiveField { field: "name" });
        }
        if self.phone.trim().is_empty() {
            return Err(OrderError::BlankReceiveField { field: "phone" });
        }
        if self.address.trim().is_empty() {
            return Err(OrderError::BlankReceiveField { field: "address" });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_new_creates_unique_ids() {
        let id1 = UserId::new();
        let id2 = UserId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_user_id_from_uuid_preserves_value() {
        let uuid = Uuid::new_v4();
        let id = UserId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), uuid);
    }

    #[test]
    fn test_line_item_line_total() {
        let item = LineItem::new("SKU-001", "Widget", 3, Money::from_cents(1000));
        assert_eq!(item.line_total().cents(), 3000);
    }

    #[test]
    fn test_line_item_serialization() {
        let item = LineItem::new("SKU-001", "Widget", 2, Money::from_cents(999));
        let json = serde_json::to_string(&item).unwrap();
        let deserialized: LineItem = serde_json::from_str(&json).unwrap();
        assert_eq!(item, deserialized);
    }

    #[test]
    fn test_receive_info_validate_accepts_filled_fields() {
        let info = ReceiveInfo::new("Ada", "555-0100", "1 Main St");
        assert!(info.validate().is_ok());
    }

    #[test]
    fn test_receive_info_validate_rejects_blank_name() {
        let info = ReceiveInfo::new("", "555-0100", "1 Main St");
        assert!(matches!(
            info.validate(),
            Err(OrderError::BlankReceiveField { field: "name" })
        ));
    }

    #[test]
    fn test_receive_info_validate_rejects_whitespace_phone() {
        let info = ReceiveInfo::new("Ada", "   ", "1 Main St");
        assert!(matches!(
            info.validate(),
            Err(OrderError::BlankReceiveField { field: "phone" })
        ));
    }

    #[test]
    fn test_receive_info_validate_rejects_blank_address() {
        let info = ReceiveInfo::new("Ada", "555-0100", "");
        assert!(matches!(
            info.validate(),
            Err(OrderError::BlankReceiveField { field: "address" })
        ));
    }
}
