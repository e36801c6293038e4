//! Cart repository.
//!
//! Each user has at most one row in `shop.carts`, created on first add.
//! `shop.cart_items` holds one row per (cart, product); duplicate adds are
//! merged by the `UNIQUE (cart_id, product_id)` upsert. Items are returned
//! in insertion order (`cart_items.id`).

use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};
use tracing::instrument;

use bazaar_core::{CartId, Price, ProductId, Quantity, UserId};

use super::RepositoryError;
use crate::models::{CartEntry, CartLine, CartProduct};

/// Outcome of [`CartRepository::add_items`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddItems {
    /// Every entry was merged into this cart.
    Added(CartId),
    /// Merging this product would overflow its quantity; nothing was applied.
    QuantityOverflow(ProductId),
}

#[derive(sqlx::FromRow)]
struct CartLineRow {
    product_id: i32,
    quantity: i32,
    name: Option<String>,
    price: Option<Decimal>,
    image: Option<String>,
    stock: Option<i32>,
}

impl TryFrom<CartLineRow> for CartLine {
    type Error = RepositoryError;

    fn try_from(row: CartLineRow) -> Result<Self, Self::Error> {
        let product_id = ProductId::new(row.product_id);
        let quantity = Quantity::new(row.quantity).map_err(|e| {
            RepositoryError::DataCorruption(format!("cart item for product {product_id}: {e}"))
        })?;

        // The LEFT JOIN yields all-NULL product columns for a deleted product.
        let product = match (row.name, row.price, row.stock) {
            (Some(name), Some(price), Some(stock)) => Some(CartProduct {
                id: product_id,
                name,
                price: Price::new(price).map_err(|e| {
                    RepositoryError::DataCorruption(format!("product {product_id}: {e}"))
                })?,
                image: row.image,
                stock,
            }),
            _ => None,
        };

        Ok(Self {
            product_id,
            quantity,
            product,
        })
    }
}

/// Load a cart's items joined against the catalog, in insertion order.
///
/// Generic over the executor so the checkout transaction can reuse it.
pub(crate) async fn fetch_lines<'e, E>(
    executor: E,
    cart_id: CartId,
) -> Result<Vec<CartLine>, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, CartLineRow>(
        r"
        SELECT ci.product_id, ci.quantity, p.name, p.price, p.image, p.stock
        FROM shop.cart_items ci
        LEFT JOIN shop.products p ON p.id = ci.product_id
        WHERE ci.cart_id = $1
        ORDER BY ci.id
        ",
    )
    .bind(cart_id)
    .fetch_all(executor)
    .await?;

    rows.into_iter().map(CartLine::try_from).collect()
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The user's cart id, if they have a cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn find_id(&self, user_id: UserId) -> Result<Option<CartId>, RepositoryError> {
        let id: Option<i32> = sqlx::query_scalar("SELECT id FROM shop.carts WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?;

        Ok(id.map(CartId::new))
    }

    /// Return the user's cart id, creating an empty cart if needed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn get_or_create(&self, user_id: UserId) -> Result<CartId, RepositoryError> {
        get_or_create_cart(self.pool, user_id).await
    }

    /// Merge entries into the user's cart.
    ///
    /// Existing items get their quantity incremented; new products are
    /// appended. All entries are applied in one transaction. An increment
    /// that would push a stored quantity past `i32::MAX` stops the merge and
    /// rolls back every entry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails (nothing is
    /// applied in that case).
    #[instrument(skip(self, entries), fields(entries = entries.len()))]
    pub async fn add_items(
        &self,
        user_id: UserId,
        entries: &[CartEntry],
    ) -> Result<AddItems, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let cart_id = get_or_create_cart(&mut *tx, user_id).await?;

        for entry in entries {
            // A conflicting row is only updated while the sum still fits.
            let result = sqlx::query(
                r"
                INSERT INTO shop.cart_items (cart_id, product_id, quantity)
                VALUES ($1, $2, $3)
                ON CONFLICT (cart_id, product_id)
                DO UPDATE SET quantity = shop.cart_items.quantity + EXCLUDED.quantity
                WHERE shop.cart_items.quantity <= 2147483647 - EXCLUDED.quantity
                ",
            )
            .bind(cart_id)
            .bind(entry.product)
            .bind(entry.quantity.get())
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Ok(AddItems::QuantityOverflow(entry.product));
            }
        }

        touch(&mut *tx, cart_id).await?;
        tx.commit().await?;

        Ok(AddItems::Added(cart_id))
    }

    /// Items of a cart with current product data.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn lines(&self, cart_id: CartId) -> Result<Vec<CartLine>, RepositoryError> {
        fetch_lines(self.pool, cart_id).await
    }

    /// Delete items whose product no longer exists. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn prune_dangling(&self, cart_id: CartId) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM shop.cart_items ci
            WHERE ci.cart_id = $1
              AND NOT EXISTS (SELECT 1 FROM shop.products p WHERE p.id = ci.product_id)
            ",
        )
        .bind(cart_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Overwrite the quantity of one item. Returns false if the item is absent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn set_quantity(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE shop.cart_items
            SET quantity = $3
            WHERE cart_id = $1 AND product_id = $2
            ",
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(quantity.get())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        touch(self.pool, cart_id).await?;
        Ok(true)
    }

    /// Remove one item. Returns false if the item is absent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn remove_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("DELETE FROM shop.cart_items WHERE cart_id = $1 AND product_id = $2")
                .bind(cart_id)
                .bind(product_id)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        touch(self.pool, cart_id).await?;
        Ok(true)
    }
}

async fn get_or_create_cart<'e, E>(executor: E, user_id: UserId) -> Result<CartId, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let id: i32 = sqlx::query_scalar(
        r"
        INSERT INTO shop.carts (user_id)
        VALUES ($1)
        ON CONFLICT (user_id) DO UPDATE SET updated_at = shop.carts.updated_at
        RETURNING id
        ",
    )
    .bind(user_id)
    .fetch_one(executor)
    .await?;

    Ok(CartId::new(id))
}

async fn touch<'e, E>(executor: E, cart_id: CartId) -> Result<(), RepositoryError>
where
    E: PgExecutor<'e>,
{
    sqlx::query("UPDATE shop.carts SET updated_at = NOW() WHERE id = $1")
        .bind(cart_id)
        .execute(executor)
        .await?;
    Ok(())
}
