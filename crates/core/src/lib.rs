//! Bazaar Core - Shared domain types.
//!
//! This crate provides the types used across the Bazaar workspace:
//! - `storefront` - JSON API server (catalog, cart, checkout, admin)
//! - `cli` - Command-line tools for migrations and store management
//!
//! # Architecture
//!
//! The core crate contains only types and their validation rules - no I/O,
//! no database access, no HTTP. The optional `postgres` feature adds `sqlx`
//! encode/decode support so the types can be bound directly in queries.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, prices, quantities and order status

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
