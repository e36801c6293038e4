//! Product route handlers.

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use bazaar_core::{Price, ProductId};

use crate::error::{ApiJson, ApiPath, Result};
use crate::middleware::RequireAdmin;
use crate::models::product::{normalize_image, validate_name, validate_stock};
use crate::models::{NewProduct, Product, ProductChanges, ProductError};
use crate::services::CatalogService;
use crate::state::AppState;

/// `POST /api/products/addproduct` body.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i64,
    pub category: Option<String>,
    pub image: Option<String>,
}

impl TryFrom<CreateProductRequest> for NewProduct {
    type Error = ProductError;

    fn try_from(req: CreateProductRequest) -> std::result::Result<Self, Self::Error> {
        Ok(Self::new(&req.name, req.price, req.stock)?
            .with_description(req.description)
            .with_category(req.category)
            .with_image(req.image))
    }
}

/// `PUT /api/products/{id}` body. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i64>,
    pub category: Option<String>,
    pub image: Option<String>,
}

impl TryFrom<UpdateProductRequest> for ProductChanges {
    type Error = ProductError;

    fn try_from(req: UpdateProductRequest) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            name: req.name.as_deref().map(validate_name).transpose()?,
            description: req.description.map(|d| d.trim().to_owned()),
            price: req.price.map(Price::new).transpose()?,
            category: req.category.map(|c| c.trim().to_owned()),
            stock: req.stock.map(validate_stock).transpose()?,
            image: normalize_image(req.image),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteProductResponse {
    pub success: bool,
    pub product: Product,
}

/// `GET /api/products`
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = CatalogService::new(state.pool(), state.images())
        .list()
        .await?;
    Ok(Json(products))
}

/// `GET /api/products/{id}`
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<Product>> {
    let product = CatalogService::new(state.pool(), state.images())
        .get(id)
        .await?;
    Ok(Json(product))
}

/// `POST /api/products/addproduct`
#[instrument(skip(state, admin, body), fields(admin_id = %admin.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(body): ApiJson<CreateProductRequest>,
) -> Result<Json<Product>> {
    let product = NewProduct::try_from(body)?;

    let created = CatalogService::new(state.pool(), state.images())
        .create(&product, admin.id)
        .await?;
    Ok(Json(created))
}

/// `PUT /api/products/{id}`
#[instrument(skip(state, _admin, body))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(body): ApiJson<UpdateProductRequest>,
) -> Result<Json<Product>> {
    let changes = ProductChanges::try_from(body)?;

    let updated = CatalogService::new(state.pool(), state.images())
        .update(id, &changes)
        .await?;
    Ok(Json(updated))
}

/// `DELETE /api/products/{id}`
#[instrument(skip(state, _admin))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<DeleteProductResponse>> {
    let product = CatalogService::new(state.pool(), state.images())
        .delete(id)
        .await?;

    Ok(Json(DeleteProductResponse {
        success: true,
        product,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_requires_price_and_stock() {
        let missing = serde_json::from_str::<CreateProductRequest>(r#"{"name": "Mug"}"#);
        assert!(missing.is_err());

        let req: CreateProductRequest =
            serde_json::from_str(r#"{"name": "Mug", "price": 12.5, "stock": 3}"#).unwrap();
        let product = NewProduct::try_from(req).unwrap();
        assert_eq!(product.price.amount(), Decimal::new(125, 1));
        assert_eq!(product.category, "");
    }

    #[test]
    fn test_update_request_validates_present_fields() {
        let req: UpdateProductRequest = serde_json::from_str(r#"{"stock": -2}"#).unwrap();
        assert_eq!(
            ProductChanges::try_from(req),
            Err(ProductError::NegativeStock(-2))
        );

        let req: UpdateProductRequest =
            serde_json::from_str(r#"{"name": " Big Mug ", "price": "3.00"}"#).unwrap();
        let changes = ProductChanges::try_from(req).unwrap();
        assert_eq!(changes.name.as_deref(), Some("Big Mug"));
        assert_eq!(changes.price.unwrap().amount(), Decimal::new(300, 2));
        assert_eq!(changes.stock, None);
    }

    #[test]
    fn test_empty_update_has_no_changes() {
        let changes = ProductChanges::try_from(UpdateProductRequest::default()).unwrap();
        assert!(changes.is_empty());
    }
}
