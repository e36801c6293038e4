//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request span with `request_id` / `user_id` fields)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers
//! 5. CORS
//! 6. Rate limiting on `/api/auth` (governor)
//!
//! Authentication is not a layer: handlers opt in with the `RequireAuth` /
//! `RequireAdmin` extractors.

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;

pub use auth::{RequireAdmin, RequireAuth};
pub use rate_limit::{auth_rate_limiter, rate_limited_json};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
