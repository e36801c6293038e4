//! Order repository (read side and admin status updates).
//!
//! Orders are written only by [`super::CheckoutTransaction`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};
use tracing::instrument;

use bazaar_core::{Email, OrderId, OrderStatus, Price, ProductId, Quantity, UserId};

use super::RepositoryError;
use crate::models::{AdminOrder, Order, OrderCustomer, OrderLineItem};

pub(crate) const ORDER_COLUMNS: &str = "id, user_id, total_price, status, created_at, updated_at";
pub(crate) const ORDER_ITEM_COLUMNS: &str = "order_id, product_id, name, price, quantity, image";

#[derive(sqlx::FromRow)]
pub(crate) struct OrderRow {
    pub(crate) id: i32,
    user_id: i32,
    total_price: Decimal,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct AdminOrderRow {
    #[sqlx(flatten)]
    order: OrderRow,
    user_name: String,
    user_email: String,
}

#[derive(sqlx::FromRow)]
pub(crate) struct OrderItemRow {
    order_id: i32,
    product_id: Option<i32>,
    name: String,
    price: Decimal,
    quantity: i32,
    image: Option<String>,
}

impl TryFrom<OrderItemRow> for OrderLineItem {
    type Error = RepositoryError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        let order_id = row.order_id;
        let corrupt = |e: &dyn std::fmt::Display| {
            RepositoryError::DataCorruption(format!("order {order_id} line item: {e}"))
        };

        Ok(Self {
            product: row.product_id.map(ProductId::new),
            quantity: Quantity::new(row.quantity).map_err(|e| corrupt(&e))?,
            name: row.name,
            price: Price::new(row.price).map_err(|e| corrupt(&e))?,
            image: row.image,
        })
    }
}

/// Combine an order row with its (already ordered) line items.
pub(crate) fn build_order(
    row: OrderRow,
    items: Vec<OrderLineItem>,
) -> Result<Order, RepositoryError> {
    let total_price = Price::new(row.total_price).map_err(|e| {
        RepositoryError::DataCorruption(format!("order {} total: {e}", row.id))
    })?;

    Ok(Order {
        id: OrderId::new(row.id),
        user_id: UserId::new(row.user_id),
        items,
        total_price,
        status: row.status,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

/// Load line items for many orders at once, grouped by order id.
async fn fetch_items<'e, E>(
    executor: E,
    order_ids: &[i32],
) -> Result<HashMap<i32, Vec<OrderLineItem>>, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, OrderItemRow>(&format!(
        "SELECT {ORDER_ITEM_COLUMNS} FROM shop.order_items WHERE order_id = ANY($1) ORDER BY order_id, id"
    ))
    .bind(order_ids)
    .fetch_all(executor)
    .await?;

    let mut grouped: HashMap<i32, Vec<OrderLineItem>> = HashMap::new();
    for row in rows {
        let order_id = row.order_id;
        grouped
            .entry(order_id)
            .or_default()
            .push(OrderLineItem::try_from(row)?);
    }
    Ok(grouped)
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an order with its line items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.with_items(row).await?)),
            None => Ok(None),
        }
    }

    /// A user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.orders WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let mut items = fetch_items(self.pool, &ids).await?;

        rows.into_iter()
            .map(|row| {
                let lines = items.remove(&row.id).unwrap_or_default();
                build_order(row, lines)
            })
            .collect()
    }

    /// Every order with the ordering user's name and email, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list_all_with_customers(&self) -> Result<Vec<AdminOrder>, RepositoryError> {
        let rows = sqlx::query_as::<_, AdminOrderRow>(
            r"
            SELECT o.id, o.user_id, o.total_price, o.status, o.created_at, o.updated_at,
                   u.name AS user_name, u.email AS user_email
            FROM shop.orders o
            JOIN shop.users u ON u.id = o.user_id
            ORDER BY o.created_at DESC, o.id DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        let ids: Vec<i32> = rows.iter().map(|r| r.order.id).collect();
        let mut items = fetch_items(self.pool, &ids).await?;

        rows.into_iter()
            .map(|row| {
                let email = Email::parse(&row.user_email).map_err(|e| {
                    RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
                })?;
                let lines = items.remove(&row.order.id).unwrap_or_default();

                Ok(AdminOrder {
                    order: build_order(row.order, lines)?,
                    user: OrderCustomer {
                        name: row.user_name,
                        email,
                    },
                })
            })
            .collect()
    }

    /// Overwrite an order's status and bump `updated_at`.
    ///
    /// Any status may follow any other.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            UPDATE shop.orders
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        self.with_items(row).await
    }

    async fn with_items(&self, row: OrderRow) -> Result<Order, RepositoryError> {
        let mut items = fetch_items(self.pool, &[row.id]).await?;
        let lines = items.remove(&row.id).unwrap_or_default();
        build_order(row, lines)
    }
}
