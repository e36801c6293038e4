//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! # Auth (rate limited per IP)
//! POST   /api/auth/createuser              - Register, returns token
//! POST   /api/auth/login                   - Log in, returns token and profile
//! POST   /api/auth/getuser                 - Profile of the token holder
//!
//! # Products
//! GET    /api/products                     - Catalog, newest first
//! GET    /api/products/{id}                - Product detail
//! POST   /api/products/addproduct          - Create (admin)
//! PUT    /api/products/{id}                - Partial update (admin)
//! DELETE /api/products/{id}                - Delete (admin)
//!
//! # Cart (requires auth)
//! GET    /api/cart                         - Cart with resolved products
//! POST   /api/cart/add                     - Merge items into the cart
//! PUT    /api/cart/update/{productId}      - Set one item's quantity
//! DELETE /api/cart/remove/{productId}      - Remove one item
//!
//! # Orders (requires auth)
//! POST   /api/order/create                 - Place an order from the cart
//! GET    /api/order/myorders               - Caller's orders, newest first
//!
//! # Admin (requires admin)
//! GET    /api/admin/users                  - All users
//! GET    /api/admin/orders                 - All orders with customer info
//! GET    /api/admin/products               - All products
//! PUT    /api/admin/orders/{orderId}/status - Set order status
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::middleware::{auth_rate_limiter, rate_limited_json};
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/createuser", post(auth::register))
        .route("/login", post(auth::login))
        .route("/getuser", post(auth::current_user))
        .layer(auth_rate_limiter())
        .layer(axum::middleware::map_response(rate_limited_json))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/addproduct", post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    use axum::routing::delete;

    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update/{product_id}", put(cart::update))
        .route("/remove/{product_id}", delete(cart::remove))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/create", post(orders::create))
        .route("/myorders", get(orders::mine))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::users))
        .route("/orders", get(admin::orders))
        .route("/products", get(admin::products))
        .route("/orders/{order_id}/status", put(admin::update_order_status))
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth_routes())
        .nest("/api/products", product_routes())
        .nest("/api/cart", cart_routes())
        .nest("/api/order", order_routes())
        .nest("/api/admin", admin_routes())
}
