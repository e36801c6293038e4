//! Domain models for the storefront.
//!
//! These are validated domain objects, separate from the database row types in
//! `crate::db`. Everything that crosses the HTTP boundary serializes with
//! camelCase field names.

pub mod cart;
pub mod order;
pub mod product;
pub mod user;

pub use cart::{CartEntry, CartItemView, CartLine, CartProduct, CartView};
pub use order::{AdminOrder, Order, OrderCustomer, OrderLineItem};
pub use product::{NewProduct, Product, ProductChanges, ProductError};
pub use user::User;
