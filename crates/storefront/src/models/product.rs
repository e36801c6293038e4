//! Product catalog types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use bazaar_core::{Price, PriceError, ProductId, UserId};

/// Minimum product name length after trimming.
pub const MIN_NAME_LENGTH: usize = 2;

/// Validation failures for product input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductError {
    /// Name is shorter than [`MIN_NAME_LENGTH`] after trimming.
    #[error("product name must be at least 2 characters")]
    NameTooShort,

    /// Price is negative, too precise or too large for storage.
    #[error(transparent)]
    Price(#[from] PriceError),

    /// Stock is below zero.
    #[error("stock cannot be negative (got {0})")]
    NegativeStock(i64),

    /// Stock does not fit the storage column.
    #[error("stock is too large (got {0})")]
    StockTooLarge(i64),
}

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category: String,
    /// Units available for ordering. Never negative.
    pub stock: i32,
    /// Absolute `http(s)` URL or a local `/uploads/<file>` path.
    pub image: Option<String>,
    /// Admin who created the product.
    pub added_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

/// A validated product ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category: String,
    pub stock: i32,
    pub image: Option<String>,
}

impl NewProduct {
    /// Validate the required fields of a new product.
    ///
    /// # Errors
    ///
    /// Returns `ProductError` if the name is too short, the price is invalid,
    /// or the stock is negative or out of range.
    pub fn new(name: &str, price: Decimal, stock: i64) -> Result<Self, ProductError> {
        Ok(Self {
            name: validate_name(name)?,
            description: String::new(),
            price: Price::new(price)?,
            category: String::new(),
            stock: validate_stock(stock)?,
            image: None,
        })
    }

    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description.map(|d| d.trim().to_owned()).unwrap_or_default();
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category.map(|c| c.trim().to_owned()).unwrap_or_default();
        self
    }

    #[must_use]
    pub fn with_image(mut self, image: Option<String>) -> Self {
        self.image = normalize_image(image);
        self
    }
}

/// A partial product update. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub category: Option<String>,
    pub stock: Option<i32>,
    pub image: Option<String>,
}

impl ProductChanges {
    /// Returns true if no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.category.is_none()
            && self.stock.is_none()
            && self.image.is_none()
    }
}

/// Trim a product name and check its length.
///
/// # Errors
///
/// Returns `ProductError::NameTooShort` if fewer than two characters remain.
pub fn validate_name(name: &str) -> Result<String, ProductError> {
    let name = name.trim();
    if name.chars().count() < MIN_NAME_LENGTH {
        return Err(ProductError::NameTooShort);
    }
    Ok(name.to_owned())
}

/// Check a stock count fits `0..=i32::MAX`.
///
/// # Errors
///
/// Returns `ProductError::NegativeStock` or `ProductError::StockTooLarge`.
pub fn validate_stock(stock: i64) -> Result<i32, ProductError> {
    if stock < 0 {
        return Err(ProductError::NegativeStock(stock));
    }
    i32::try_from(stock).map_err(|_| ProductError::StockTooLarge(stock))
}

/// Blank image references are treated as "no image".
#[must_use]
pub fn normalize_image(image: Option<String>) -> Option<String> {
    image
        .map(|i| i.trim().to_owned())
        .filter(|i| !i.is_empty())
}
