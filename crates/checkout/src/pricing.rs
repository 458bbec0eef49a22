//! Pricing and line-item construction.

use std::collections::HashMap;

use domain::{CartItem, LineItem};
use store::CatalogStore;

use crate::error::{CheckoutError, Result};

/// Builds priced line items from a requested cart.
///
/// Quantities are validated before any store access. Duplicate product
/// entries are merged in first-occurrence order with summed quantities,
/// then all products are resolved in one batched lookup and the current
/// unit price is captured into the line items. Later catalog price
/// changes do not reach an already built order. Stock is neither read
/// nor changed here.
pub async fn price_cart<C: CatalogStore>(catalog: &C, cart: &[CartItem]) -> Result<Vec<LineItem>> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    for item in cart {
        if item.quantity == 0 {
            return Err(CheckoutError::InvalidQuantity {
                product_id: item.product_id.clone(),
                quantity: item.quantity,
            });
        }
    }

    let mut merged: Vec<CartItem> = Vec::with_capacity(cart.len());
    for item in cart {
        match merged
            .iter_mut()
            .find(|line| line.product_id == item.product_id)
        {
            Some(line) => line.quantity += item.quantity,
            None => merged.push(item.clone()),
        }
    }

    let ids: Vec<_> = merged.iter().map(|item| item.product_id.clone()).collect();
    let products = catalog.get_products(&ids).await?;
    let by_id: HashMap<_, _> = products
        .into_iter()
        .map(|product| (product.id.clone(), product))
        .collect();

    let mut items = Vec::with_capacity(merged.len());
    for requested in &merged {
        let product = by_id
            .get(&requested.product_id)
            .ok_or_else(|| CheckoutError::ProductNotFound(requested.product_id.clone()))?;
        items.push(LineItem::new(
            product.id.clone(),
            product.name.clone(),
            requested.quantity,
            product.unit_price,
        ));
    }

    Ok(items)
}
