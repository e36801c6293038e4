//! Admin dashboard route handlers.
//!
//! All handlers require [`RequireAdmin`].

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use bazaar_core::{OrderId, OrderStatus};

use crate::db::{OrderRepository, UserRepository};
use crate::error::{ApiJson, ApiPath, AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{AdminOrder, Order, Product, User};
use crate::services::CatalogService;
use crate::state::AppState;

/// `PUT /api/admin/orders/{orderId}/status` body.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct UpdateStatusResponse {
    pub success: bool,
    pub order: Order,
}

/// `GET /api/admin/users`
pub async fn users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<User>>> {
    let users = UserRepository::new(state.pool()).list_all().await?;
    Ok(Json(users))
}

/// `GET /api/admin/orders`
pub async fn orders(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<AdminOrder>>> {
    let orders = OrderRepository::new(state.pool())
        .list_all_with_customers()
        .await?;
    Ok(Json(orders))
}

/// `GET /api/admin/products`
pub async fn products(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<Product>>> {
    let products = CatalogService::new(state.pool(), state.images())
        .list()
        .await?;
    Ok(Json(products))
}

/// `PUT /api/admin/orders/{orderId}/status`
#[instrument(skip(state, admin, body), fields(admin_id = %admin.id))]
pub async fn update_order_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(order_id): ApiPath<OrderId>,
    ApiJson(body): ApiJson<UpdateStatusRequest>,
) -> Result<Json<UpdateStatusResponse>> {
    let status: OrderStatus = body.status.parse().map_err(AppError::Validation)?;

    let order = OrderRepository::new(state.pool())
        .update_status(order_id, status)
        .await?;

    tracing::info!(%order_id, %status, "order status updated");

    Ok(Json(UpdateStatusResponse {
        success: true,
        order,
    }))
}
