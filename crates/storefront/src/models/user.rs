//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bazaar_core::{Email, UserId};

/// A storefront account.
///
/// The password hash is never part of this type; it is only read by
/// `UserRepository::get_password_hash` during login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Login email (normalized).
    pub email: Email,
    /// Whether the user may call admin routes.
    pub is_admin: bool,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}
