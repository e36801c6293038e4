//! Catalog management.

use sqlx::PgPool;
use tracing::{info, instrument};

use bazaar_core::{ProductId, UserId};

use super::images::ImageStore;
use crate::db::{ProductRepository, RepositoryError};
use crate::models::{NewProduct, Product, ProductChanges};

/// Product reads and admin writes.
pub struct CatalogService<'a> {
    products: ProductRepository<'a>,
    images: &'a ImageStore,
}

impl<'a> CatalogService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, images: &'a ImageStore) -> Self {
        Self {
            products: ProductRepository::new(pool),
            images,
        }
    }

    /// All products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        self.products.list_all().await
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn get(&self, id: ProductId) -> Result<Product, RepositoryError> {
        self.products
            .get_by_id(id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create(
        &self,
        product: &NewProduct,
        added_by: UserId,
    ) -> Result<Product, RepositoryError> {
        let created = self.products.create(product, Some(added_by)).await?;
        info!(product_id = %created.id, %added_by, "product created");
        Ok(created)
    }

    /// Apply a partial update. An empty change set returns the product as is.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    #[instrument(skip(self, changes))]
    pub async fn update(
        &self,
        id: ProductId,
        changes: &ProductChanges,
    ) -> Result<Product, RepositoryError> {
        if changes.is_empty() {
            return self.get(id).await;
        }
        self.products.update(id, changes).await
    }

    /// Delete a product and, best effort, its local image file.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ProductId) -> Result<Product, RepositoryError> {
        let deleted = self.products.delete(id).await?;
        self.images
            .remove_product_image(deleted.image.as_deref())
            .await;
        info!(product_id = %deleted.id, "product deleted");
        Ok(deleted)
    }
}
