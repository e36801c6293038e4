//! Order placement.
//!
//! Turns the user's cart into an order:
//!
//! 1. lock the cart and load its items with current product data
//! 2. check stock for every item whose product still exists
//! 3. snapshot name, price and image of those items (deleted products are dropped)
//! 4. decrement stock with a guarded update, insert the order, empty the cart
//!
//! Steps run on one transaction; any failure leaves cart, stock and orders
//! untouched.

use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, instrument};

use bazaar_core::{Price, ProductId, Quantity, UserId};

use super::images::ImageStore;
use crate::db::{CheckoutTransaction, RepositoryError};
use crate::models::{CartLine, Order, OrderLineItem};

/// Why an order could not be placed.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// No cart, or a cart without items.
    #[error("cart is empty")]
    EmptyCart,

    /// A product has fewer units than requested.
    #[error("not enough stock for \"{name}\": available {available}, requested {requested}")]
    InsufficientStock {
        product: ProductId,
        name: String,
        available: i32,
        requested: Quantity,
    },

    /// Every item in the cart refers to a deleted product.
    #[error("no valid products in cart")]
    NoValidItems,

    /// The order total is above the largest storable price.
    #[error("order total exceeds {max}", max = Price::MAX)]
    TotalTooLarge,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// A validated, not yet persisted order line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftLine {
    pub product: ProductId,
    pub quantity: Quantity,
    pub name: String,
    pub price: Price,
    /// The product's image reference, before snapshotting.
    pub image: Option<String>,
}

/// Line items and total computed from a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub lines: Vec<DraftLine>,
    pub total: Price,
}

impl OrderDraft {
    /// Validate a cart and snapshot its items.
    ///
    /// # Errors
    ///
    /// - `CheckoutError::EmptyCart` if `lines` is empty
    /// - `CheckoutError::InsufficientStock` for the first live item whose
    ///   stock is below its quantity
    /// - `CheckoutError::NoValidItems` if every item's product is gone
    /// - `CheckoutError::TotalTooLarge` if the total exceeds [`Price::MAX`]
    pub fn from_cart(lines: &[CartLine]) -> Result<Self, CheckoutError> {
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        for line in lines {
            if let Some(product) = &line.product
                && product.stock < line.quantity.get()
            {
                return Err(CheckoutError::InsufficientStock {
                    product: product.id,
                    name: product.name.clone(),
                    available: product.stock,
                    requested: line.quantity,
                });
            }
        }

        let draft: Vec<DraftLine> = lines
            .iter()
            .filter_map(|line| {
                line.product.as_ref().map(|product| DraftLine {
                    product: product.id,
                    quantity: line.quantity,
                    name: product.name.clone(),
                    price: product.price,
                    image: product.image.clone(),
                })
            })
            .collect();

        if draft.is_empty() {
            return Err(CheckoutError::NoValidItems);
        }

        let total = draft
            .iter()
            .try_fold(Price::ZERO, |total, l| total.checked_add(l.price.times(l.quantity)))
            .filter(|total| *total <= Price::MAX)
            .ok_or(CheckoutError::TotalTooLarge)?;

        Ok(Self {
            lines: draft,
            total,
        })
    }
}

/// Places orders.
pub struct CheckoutService<'a> {
    pool: &'a PgPool,
    images: &'a ImageStore,
}

impl<'a> CheckoutService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, images: &'a ImageStore) -> Self {
        Self { pool, images }
    }

    /// Convert the user's cart into a `Pending` order.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart`, `CheckoutError::InsufficientStock`,
    /// `CheckoutError::NoValidItems` or `CheckoutError::TotalTooLarge` as
    /// described on
    /// [`OrderDraft::from_cart`]. `InsufficientStock` is also returned when a
    /// concurrent order consumed the stock after it was read.
    #[instrument(skip(self))]
    pub async fn place_order(&self, user_id: UserId) -> Result<Order, CheckoutError> {
        let mut tx = CheckoutTransaction::begin(self.pool).await?;

        let Some(cart_id) = tx.lock_cart(user_id).await? else {
            return Err(CheckoutError::EmptyCart);
        };

        let lines = tx.cart_lines(cart_id).await?;
        let draft = OrderDraft::from_cart(&lines)?;

        for line in &draft.lines {
            if !tx.decrement_stock(line.product, line.quantity).await? {
                let available = tx.current_stock(line.product).await?;
                return Err(CheckoutError::InsufficientStock {
                    product: line.product,
                    name: line.name.clone(),
                    available,
                    requested: line.quantity,
                });
            }
        }

        let mut items = Vec::with_capacity(draft.lines.len());
        for line in draft.lines {
            let image = self.images.snapshot(line.image.as_deref()).await;
            items.push(OrderLineItem {
                product: Some(line.product),
                quantity: line.quantity,
                name: line.name,
                price: line.price,
                image,
            });
        }

        let order = tx.insert_order(user_id, &items, draft.total).await?;
        tx.clear_cart(cart_id).await?;
        tx.commit().await?;

        info!(
            order_id = %order.id,
            %user_id,
            items = order.items.len(),
            total = %order.total_price,
            "order placed"
        );

        Ok(order)
    }
}
