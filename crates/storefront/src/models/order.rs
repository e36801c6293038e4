//! Order types.
//!
//! Orders own their line items by value. A line item is a snapshot of the
//! product taken when the order was placed; later catalog edits or deletions
//! never change it.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bazaar_core::{Email, OrderId, OrderStatus, Price, ProductId, Quantity, UserId};

/// A snapshotted order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItem {
    /// Product at the time of ordering. May no longer exist.
    pub product: Option<ProductId>,
    pub quantity: Quantity,
    pub name: String,
    /// Unit price at the time of ordering.
    pub price: Price,
    pub image: Option<String>,
}

impl OrderLineItem {
    /// Unit price × quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    /// In cart order at the time of placement.
    pub items: Vec<OrderLineItem>,
    pub total_price: Price,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Who placed an order, for admin listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderCustomer {
    pub name: String,
    pub email: Email,
}

/// An order annotated with its customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminOrder {
    #[serde(flatten)]
    pub order: Order,
    pub user: OrderCustomer,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_admin_order_flattens_order_fields() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let order = Order {
            id: OrderId::new(3),
            user_id: UserId::new(1),
            items: vec![OrderLineItem {
                product: None,
                quantity: Quantity::new(2).unwrap(),
                name: "Lamp".to_string(),
                price: Price::new(Decimal::new(1250, 2)).unwrap(),
                image: None,
            }],
            total_price: Price::new(Decimal::new(2500, 2)).unwrap(),
            status: OrderStatus::Shipped,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(order.items[0].line_total(), order.total_price);

        let admin = AdminOrder {
            order,
            user: OrderCustomer {
                name: "Ada".to_string(),
                email: Email::parse("ada@example.com").unwrap(),
            },
        };

        let json = serde_json::to_value(&admin).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["status"], "Shipped");
        assert_eq!(json["totalPrice"], "25.00");
        assert_eq!(json["items"][0]["product"], serde_json::Value::Null);
        assert_eq!(json["user"]["email"], "ada@example.com");
    }
}
