//! Seed the catalog from a YAML file.
//!
//! ```yaml
//! products:
//!   - name: Tea Pot
//!     price: "25.00"
//!     stock: 4
//!     category: kitchen
//!     description: Cast iron, 1.2 l
//!     image: https://cdn.example.com/teapot.jpg
//! ```
//!
//! Every entry is validated like the create endpoint before anything is
//! inserted. Seeded products have no `added_by`.

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{error, info};

use bazaar_storefront::db::ProductRepository;
use bazaar_storefront::models::NewProduct;

/// Top-level catalog file.
#[derive(Debug, Deserialize)]
pub struct CatalogFile {
    pub products: Vec<SeedProduct>,
}

/// One product entry.
#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    pub name: String,
    pub price: Decimal,
    pub stock: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Validate every entry, collecting one message per bad entry.
///
/// # Errors
///
/// Returns the messages if any entry is invalid.
pub fn validate_catalog(catalog: CatalogFile) -> Result<Vec<NewProduct>, Vec<String>> {
    let mut products = Vec::with_capacity(catalog.products.len());
    let mut errors = Vec::new();

    for (index, entry) in catalog.products.into_iter().enumerate() {
        match NewProduct::new(&entry.name, entry.price, entry.stock) {
            Ok(product) => products.push(
                product
                    .with_description(entry.description)
                    .with_category(entry.category)
                    .with_image(entry.image),
            ),
            Err(e) => errors.push(format!("products[{index}] ({}): {e}", entry.name.trim())),
        }
    }

    if errors.is_empty() {
        Ok(products)
    } else {
        Err(errors)
    }
}

/// Insert the products listed in a YAML catalog.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, any entry fails
/// validation, or an insert fails.
pub async fn products(file_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    info!(path = %file_path.display(), "Loading catalog from file");

    // Read and validate YAML before connecting to database
    let content = tokio::fs::read_to_string(file_path).await?;
    let catalog: CatalogFile = serde_yaml::from_str(&content)?;

    let products = match validate_catalog(catalog) {
        Ok(products) => products,
        Err(errors) => {
            error!("Catalog validation failed:");
            for err in &errors {
                error!("  - {err}");
            }
            return Err(format!("{} validation errors found", errors.len()).into());
        }
    };

    info!(products = products.len(), "Catalog validated successfully");

    let pool = super::connect().await?;
    let repo = ProductRepository::new(&pool);

    for product in &products {
        let created = repo.create(product, None).await?;
        info!(id = %created.id, name = %created.name, "Inserted product");
    }

    info!("Seeding complete! {} products inserted", products.len());
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"
products:
  - name: Tea Pot
    price: "25.00"
    stock: 4
    category: " kitchen "
  - name: Sticker
    price: 0
    stock: 0
    image: "  "
"#;

    #[test]
    fn test_parse_and_validate_catalog() {
        let catalog: CatalogFile = serde_yaml::from_str(CATALOG).unwrap();
        let products = validate_catalog(catalog).unwrap();

        assert_eq!(products.len(), 2);
        assert_eq!(products[0].name, "Tea Pot");
        assert_eq!(products[0].price.amount(), Decimal::new(2500, 2));
        assert_eq!(products[0].category, "kitchen");
        assert_eq!(products[0].description, "");
        assert_eq!(products[1].stock, 0);
        assert_eq!(products[1].image, None);
    }

    #[test]
    fn test_invalid_entries_are_all_reported() {
        let catalog: CatalogFile = serde_yaml::from_str(
            r#"
products:
  - name: X
    price: 1
    stock: 1
  - name: Lamp
    price: 10
    stock: 2
  - name: Chair
    price: "-3"
    stock: 1
"#,
        )
        .unwrap();

        let errors = validate_catalog(catalog).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].starts_with("products[0]"));
        assert!(errors[1].starts_with("products[2] (Chair)"));
    }

    #[test]
    fn test_missing_required_field_fails_to_parse() {
        let result = serde_yaml::from_str::<CatalogFile>("products:\n  - name: Lamp\n    stock: 1\n");
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_products_rejects_invalid_file_before_connecting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.yaml");
        std::fs::write(&path, "products:\n  - name: X\n    price: 1\n    stock: 1\n").unwrap();

        let err = products(&path).await.unwrap_err();
        assert_eq!(err.to_string(), "1 validation errors found");
    }
}
