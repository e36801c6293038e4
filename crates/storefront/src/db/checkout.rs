//! The order-placement transaction.
//!
//! Every statement of a checkout runs on one `PostgreSQL` transaction. The
//! user's cart row is locked first, so two checkouts for the same user
//! serialize. Stock is decremented with a guarded `UPDATE` that only matches
//! when enough stock remains, so two checkouts for different users can never
//! oversell. Dropping a `CheckoutTransaction` without calling `commit` rolls
//! everything back.

use bazaar_core::{CartId, OrderStatus, Price, ProductId, Quantity, UserId};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;

use super::RepositoryError;
use super::carts::fetch_lines;
use super::orders::{ORDER_COLUMNS, ORDER_ITEM_COLUMNS, OrderItemRow, OrderRow, build_order};
use crate::models::{CartLine, Order, OrderLineItem};

/// An open checkout transaction.
pub struct CheckoutTransaction {
    tx: Transaction<'static, Postgres>,
}

impl CheckoutTransaction {
    /// Begin a transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if no connection is available.
    pub async fn begin(pool: &PgPool) -> Result<Self, RepositoryError> {
        Ok(Self {
            tx: pool.begin().await?,
        })
    }

    /// Lock the user's cart row. Returns `None` if the user has no cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn lock_cart(&mut self, user_id: UserId) -> Result<Option<CartId>, RepositoryError> {
        let id: Option<i32> =
            sqlx::query_scalar("SELECT id FROM shop.carts WHERE user_id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut *self.tx)
                .await?;

        Ok(id.map(CartId::new))
    }

    /// Cart items joined against the catalog, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn cart_lines(&mut self, cart_id: CartId) -> Result<Vec<CartLine>, RepositoryError> {
        fetch_lines(&mut *self.tx, cart_id).await
    }

    /// Decrement stock only if at least `quantity` units remain.
    ///
    /// Returns `false` when the guard did not match (stock too low, or the
    /// product vanished), leaving the row untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn decrement_stock(
        &mut self,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE shop.products
            SET stock = stock - $2
            WHERE id = $1 AND stock >= $2
            ",
        )
        .bind(product_id)
        .bind(quantity.get())
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Current stock of a product as seen by this transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn current_stock(&mut self, product_id: ProductId) -> Result<i32, RepositoryError> {
        let stock: Option<i32> = sqlx::query_scalar("SELECT stock FROM shop.products WHERE id = $1")
            .bind(product_id)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(stock.unwrap_or(0))
    }

    /// Insert an order and its line items, in the given order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if an insert fails.
    #[instrument(skip(self, items), fields(items = items.len(), total = %total_price))]
    pub async fn insert_order(
        &mut self,
        user_id: UserId,
        items: &[OrderLineItem],
        total_price: Price,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            INSERT INTO shop.orders (user_id, total_price, status)
            VALUES ($1, $2, $3)
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(user_id)
        .bind(total_price.amount())
        .bind(OrderStatus::Pending)
        .fetch_one(&mut *self.tx)
        .await?;

        let order_id = row.id;
        let mut stored = Vec::with_capacity(items.len());

        for item in items {
            let item_row = sqlx::query_as::<_, OrderItemRow>(&format!(
                r"
                INSERT INTO shop.order_items (order_id, product_id, name, price, quantity, image)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING {ORDER_ITEM_COLUMNS}
                "
            ))
            .bind(order_id)
            .bind(item.product)
            .bind(&item.name)
            .bind(item.price.amount())
            .bind(item.quantity.get())
            .bind(item.image.as_deref())
            .fetch_one(&mut *self.tx)
            .await?;

            stored.push(OrderLineItem::try_from(item_row)?);
        }

        build_order(row, stored)
    }

    /// Delete every item of the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear_cart(&mut self, cart_id: CartId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM shop.cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(&mut *self.tx)
            .await?;

        sqlx::query("UPDATE shop.carts SET updated_at = NOW() WHERE id = $1")
            .bind(cart_id)
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }

    /// Commit the transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the commit fails.
    pub async fn commit(self) -> Result<(), RepositoryError> {
        self.tx.commit().await?;
        Ok(())
    }
}
