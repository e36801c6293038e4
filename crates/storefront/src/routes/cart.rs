//! Cart route handlers.
//!
//! Every handler acts on the caller's own cart; the cart id never appears
//! in a path.

use axum::{Json, extract::State};
use serde::Deserialize;
use tracing::instrument;

use bazaar_core::ProductId;

use crate::error::{ApiJson, ApiPath, Result};
use crate::middleware::RequireAuth;
use crate::models::{CartEntry, CartView};
use crate::services::CartService;
use crate::services::cart::RemovedItem;
use crate::state::AppState;

/// `POST /api/cart/add` body.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub items: Vec<CartEntry>,
}

/// `PUT /api/cart/update/{productId}` body.
///
/// Kept as a plain integer so zero and negative values reach validation
/// instead of failing deserialization.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

/// `GET /api/cart`
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<CartView>> {
    let cart = CartService::new(state.pool()).view(user.id).await?;
    Ok(Json(cart))
}

/// `POST /api/cart/add`
#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(body): ApiJson<AddToCartRequest>,
) -> Result<Json<CartView>> {
    let cart = CartService::new(state.pool())
        .add(user.id, &body.items)
        .await?;
    Ok(Json(cart))
}

/// `PUT /api/cart/update/{productId}`
#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(product_id): ApiPath<ProductId>,
    ApiJson(body): ApiJson<UpdateQuantityRequest>,
) -> Result<Json<CartView>> {
    let cart = CartService::new(state.pool())
        .update(user.id, product_id, body.quantity)
        .await?;
    Ok(Json(cart))
}

/// `DELETE /api/cart/remove/{productId}`
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(product_id): ApiPath<ProductId>,
) -> Result<Json<RemovedItem>> {
    let removed = CartService::new(state.pool())
        .remove(user.id, product_id)
        .await?;
    Ok(Json(removed))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_add_request_shape() {
        let req: AddToCartRequest = serde_json::from_str(
            r#"{"items": [{"product": 4, "quantity": 2}, {"product": 9, "quantity": 1}]}"#,
        )
        .unwrap();
        assert_eq!(req.items.len(), 2);
        assert_eq!(req.items[0].product, ProductId::new(4));
        assert_eq!(req.items[0].quantity.get(), 2);
    }

    #[test]
    fn test_add_request_rejects_zero_quantity() {
        let req =
            serde_json::from_str::<AddToCartRequest>(r#"{"items": [{"product": 4, "quantity": 0}]}"#);
        assert!(req.is_err());
    }

    #[test]
    fn test_update_request_accepts_any_integer() {
        let req: UpdateQuantityRequest = serde_json::from_str(r#"{"quantity": 0}"#).unwrap();
        assert_eq!(req.quantity, 0);
    }
}
