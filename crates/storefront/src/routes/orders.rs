//! Order route handlers.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use crate::db::OrderRepository;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::Order;
use crate::services::CheckoutService;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PlaceOrderResponse {
    pub msg: &'static str,
    pub order: Order,
}

/// `POST /api/order/create`
///
/// Converts the caller's cart into an order. Stock is reserved and the cart
/// emptied in the same transaction.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<PlaceOrderResponse>> {
    let order = CheckoutService::new(state.pool(), state.images())
        .place_order(user.id)
        .await?;

    Ok(Json(PlaceOrderResponse {
        msg: "Order placed successfully",
        order,
    }))
}

/// `GET /api/order/myorders`
pub async fn mine(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;
    Ok(Json(orders))
}
