//! Shopping cart types.

use serde::{Deserialize, Serialize};

use bazaar_core::{CartId, Price, ProductId, Quantity};

/// One `{product, quantity}` pair from an add-to-cart request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CartEntry {
    pub product: ProductId,
    pub quantity: Quantity,
}

/// Current product data resolved for a cart item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartProduct {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub image: Option<String>,
    pub stock: i32,
}

/// A stored cart item joined against the catalog.
///
/// `product` is `None` when the referenced product has been deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub product: Option<CartProduct>,
}

/// A cart item as returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItemView {
    pub product: CartProduct,
    pub quantity: Quantity,
}

/// A cart with product details resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    /// `None` if the user has never added anything.
    pub id: Option<CartId>,
    pub items: Vec<CartItemView>,
    /// Σ current price × quantity.
    pub subtotal: Price,
}

impl CartView {
    /// The view of a user with no cart.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            id: None,
            items: Vec::new(),
            subtotal: Price::ZERO,
        }
    }

    /// Build a view from joined lines, skipping lines whose product is gone.
    #[must_use]
    pub fn from_lines(id: CartId, lines: Vec<CartLine>) -> Self {
        let items: Vec<CartItemView> = lines
            .into_iter()
            .filter_map(|line| {
                line.product.map(|product| CartItemView {
                    product,
                    quantity: line.quantity,
                })
            })
            .collect();

        let subtotal = items
            .iter()
            .map(|item| item.product.price.times(item.quantity))
            .sum();

        Self {
            id: Some(id),
            items,
            subtotal,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
