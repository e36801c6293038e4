//! Admin flag management commands.
//!
//! # Usage
//!
//! ```bash
//! bazaar-cli admin grant -e admin@example.com
//! bazaar-cli admin revoke -e admin@example.com
//! ```
//!
//! The user must already be registered through the API.

use bazaar_core::{Email, EmailError};
use bazaar_storefront::db::{RepositoryError, UserRepository};
use thiserror::Error;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// No registered user has this email.
    #[error("No user registered with email: {0}")]
    UserNotFound(String),

    /// Database error.
    #[error("Database error: {0}")]
    Repository(RepositoryError),
}

/// Set or clear the admin flag of an existing user.
///
/// # Errors
///
/// Returns `AdminError::UserNotFound` if nobody has registered with `email`.
pub async fn set_admin(email: &str, is_admin: bool) -> Result<(), Box<dyn std::error::Error>> {
    let email = Email::parse(email).map_err(AdminError::from)?;
    let pool = super::connect().await?;

    let user = UserRepository::new(&pool)
        .set_admin(&email, is_admin)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AdminError::UserNotFound(email.to_string()),
            other => AdminError::Repository(other),
        })?;

    if is_admin {
        tracing::info!("Granted admin rights to {} (ID: {})", user.email, user.id);
    } else {
        tracing::info!("Revoked admin rights from {} (ID: {})", user.email, user.id);
    }

    Ok(())
}
