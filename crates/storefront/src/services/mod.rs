//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Registration, login, bearer tokens
//! - `cart` - Cart merging, updates and the product-resolved view
//! - `catalog` - Product reads and admin writes
//! - `checkout` - Order placement
//! - `images` - Product image files and order image snapshots
//!
//! Services borrow the pool (and any shared helpers) from `AppState` for the
//! duration of one request.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod images;

pub use auth::{AuthError, AuthService, TokenService};
pub use cart::{CartError, CartService};
pub use catalog::CatalogService;
pub use checkout::{CheckoutError, CheckoutService};
pub use images::ImageStore;
