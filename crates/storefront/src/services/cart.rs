//! Cart service.
//!
//! Wraps [`CartRepository`] with request validation, lazy cleanup of items
//! whose product was deleted, and the product-resolved cart view.

use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use bazaar_core::{ProductId, Quantity, QuantityError, UserId};

use crate::db::carts::AddItems;
use crate::db::{CartRepository, ProductRepository, RepositoryError};
use crate::models::{CartEntry, CartView};

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// An add request carried no items.
    #[error("at least one item is required")]
    EmptyRequest,

    /// A quantity was zero, negative or too large.
    #[error(transparent)]
    InvalidQuantity(#[from] QuantityError),

    /// Merged quantities overflowed.
    #[error("quantity for product {0} is too large")]
    QuantityOverflow(ProductId),

    /// An add referenced a product that does not exist.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// The user has no cart.
    #[error("cart not found")]
    CartNotFound,

    /// The cart has no item for this product.
    #[error("product {0} not in cart")]
    ItemNotFound(ProductId),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Result of removing an item.
#[derive(Debug, Clone, Serialize)]
pub struct RemovedItem {
    pub message: &'static str,
    pub cart: CartView,
}

/// Cart operations for one request.
pub struct CartService<'a> {
    carts: CartRepository<'a>,
    products: ProductRepository<'a>,
}

impl<'a> CartService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            carts: CartRepository::new(pool),
            products: ProductRepository::new(pool),
        }
    }

    /// The user's cart with current product data.
    ///
    /// Items whose product has been deleted are removed from storage and
    /// left out of the view. A user without a cart gets an empty view.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the database fails.
    #[instrument(skip(self))]
    pub async fn view(&self, user_id: UserId) -> Result<CartView, CartError> {
        let Some(cart_id) = self.carts.find_id(user_id).await? else {
            return Ok(CartView::empty());
        };

        let pruned = self.carts.prune_dangling(cart_id).await?;
        if pruned > 0 {
            tracing::debug!(%cart_id, pruned, "removed cart items for deleted products");
        }

        let lines = self.carts.lines(cart_id).await?;
        Ok(CartView::from_lines(cart_id, lines))
    }

    /// Merge items into the user's cart, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns `CartError::EmptyRequest` for an empty list,
    /// `CartError::ProductNotFound` if any product is unknown (nothing is
    /// added in that case), and `CartError::QuantityOverflow` if duplicate
    /// entries, or an entry plus the quantity already in the cart, sum past
    /// the maximum.
    #[instrument(skip(self, entries), fields(entries = entries.len()))]
    pub async fn add(&self, user_id: UserId, entries: &[CartEntry]) -> Result<CartView, CartError> {
        if entries.is_empty() {
            return Err(CartError::EmptyRequest);
        }

        let merged = coalesce(entries)?;

        let ids: Vec<ProductId> = merged.iter().map(|e| e.product).collect();
        if let Some(missing) = self.products.missing_ids(&ids).await?.first() {
            return Err(CartError::ProductNotFound(*missing));
        }

        match self.carts.add_items(user_id, &merged).await? {
            AddItems::Added(_) => self.view(user_id).await,
            AddItems::QuantityOverflow(product) => Err(CartError::QuantityOverflow(product)),
        }
    }

    /// Overwrite the quantity of one cart item.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` if `quantity < 1`,
    /// `CartError::CartNotFound` or `CartError::ItemNotFound`.
    #[instrument(skip(self))]
    pub async fn update(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<CartView, CartError> {
        let quantity = Quantity::try_from(quantity)?;

        let cart_id = self
            .carts
            .find_id(user_id)
            .await?
            .ok_or(CartError::CartNotFound)?;

        if !self
            .carts
            .set_quantity(cart_id, product_id, quantity)
            .await?
        {
            return Err(CartError::ItemNotFound(product_id));
        }

        self.view(user_id).await
    }

    /// Remove one item from the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::CartNotFound` or `CartError::ItemNotFound`; the
    /// cart is unchanged in both cases.
    #[instrument(skip(self))]
    pub async fn remove(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<RemovedItem, CartError> {
        let cart_id = self
            .carts
            .find_id(user_id)
            .await?
            .ok_or(CartError::CartNotFound)?;

        if !self.carts.remove_item(cart_id, product_id).await? {
            return Err(CartError::ItemNotFound(product_id));
        }

        let cart = self.view(user_id).await?;
        let message = if cart.is_empty() {
            "Item removed. Cart is now empty"
        } else {
            "Item removed from cart"
        };

        Ok(RemovedItem { message, cart })
    }
}

/// Merge duplicate products, summing quantities and keeping first-seen order.
///
/// # Errors
///
/// Returns `CartError::QuantityOverflow` if a sum does not fit.
pub fn coalesce(entries: &[CartEntry]) -> Result<Vec<CartEntry>, CartError> {
    let mut merged: Vec<CartEntry> = Vec::with_capacity(entries.len());

    for entry in entries {
        match merged.iter_mut().find(|m| m.product == entry.product) {
            Some(existing) => {
                existing.quantity = existing
                    .quantity
                    .checked_add(entry.quantity)
                    .ok_or(CartError::QuantityOverflow(entry.product))?;
            }
            None => merged.push(*entry),
        }
    }

    Ok(merged)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn entry(product: i32, quantity: i32) -> CartEntry {
        CartEntry {
            product: ProductId::new(product),
            quantity: Quantity::new(quantity).unwrap(),
        }
    }

    #[test]
    fn test_coalesce_sums_duplicates_in_first_seen_order() {
        let merged = coalesce(&[entry(3, 1), entry(1, 2), entry(3, 4)]).unwrap();
        assert_eq!(merged, vec![entry(3, 5), entry(1, 2)]);
    }

    #[test]
    fn test_coalesce_keeps_distinct_entries() {
        let entries = [entry(1, 1), entry(2, 1)];
        assert_eq!(coalesce(&entries).unwrap(), entries.to_vec());
    }

    #[test]
    fn test_coalesce_overflow() {
        let result = coalesce(&[entry(1, i32::MAX), entry(1, 1)]);
        assert!(matches!(result, Err(CartError::QuantityOverflow(p)) if p == ProductId::new(1)));
    }

    #[test]
    fn test_removed_item_serializes() {
        let removed = RemovedItem {
            message: "Item removed. Cart is now empty",
            cart: CartView::empty(),
        };
        let json = serde_json::to_value(&removed).unwrap();
        assert_eq!(json["message"], "Item removed. Cart is now empty");
        assert_eq!(json["cart"]["items"], serde_json::json!([]));
    }
}
