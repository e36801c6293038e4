//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, AppError>`.
//!
//! Every error response has the same JSON shape:
//!
//! ```json
//! {"error": {"kind": "insufficient_stock", "message": "...", "product": 3, "available": 1, "requested": 2}}
//! ```

use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value, json};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::ProductError;
use crate::services::auth::TokenError;
use crate::services::{AuthError, CartError, CheckoutError};

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Order placement failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Product input failed validation.
    #[error("Invalid product: {0}")]
    InvalidProduct(#[from] ProductError),

    /// No valid credentials on the request.
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Authenticated but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed or invalid request.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Conflicts with existing data.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// How an error is presented to the client.
struct ErrorBody {
    status: StatusCode,
    kind: &'static str,
    message: String,
    details: Map<String, Value>,
}

impl ErrorBody {
    fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
            details: Map::new(),
        }
    }

    fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal",
            "Internal server error",
        )
    }

    fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthenticated", message)
    }

    fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "validation_error", message)
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }
}

fn repository_body(err: &RepositoryError) -> ErrorBody {
    match err {
        RepositoryError::NotFound => ErrorBody::not_found("Not found"),
        RepositoryError::Conflict(msg) => ErrorBody::new(StatusCode::CONFLICT, "conflict", msg),
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => ErrorBody::internal(),
    }
}

impl AppError {
    fn body(&self) -> ErrorBody {
        match self {
            Self::Database(err) => repository_body(err),
            Self::Auth(err) => match err {
                AuthError::InvalidEmail(_) => ErrorBody::validation("Invalid email address"),
                AuthError::InvalidName { .. } | AuthError::WeakPassword(_) => {
                    ErrorBody::validation(err.to_string())
                }
                AuthError::InvalidCredentials => ErrorBody::unauthenticated("Invalid credentials"),
                AuthError::UserAlreadyExists => ErrorBody::new(
                    StatusCode::CONFLICT,
                    "conflict",
                    "An account with this email already exists",
                ),
                AuthError::UserNotFound
                | AuthError::Token(TokenError::Expired | TokenError::Invalid(_)) => {
                    ErrorBody::unauthenticated("Invalid or expired token")
                }
                AuthError::Repository(err) => repository_body(err),
                AuthError::Token(TokenError::Generation(_)) | AuthError::PasswordHash => {
                    ErrorBody::internal()
                }
            },
            Self::Cart(err) => match err {
                CartError::EmptyRequest
                | CartError::InvalidQuantity(_)
                | CartError::QuantityOverflow(_) => ErrorBody::validation(err.to_string()),
                CartError::ProductNotFound(id) => {
                    ErrorBody::not_found(format!("Product {id} not found"))
                }
                CartError::CartNotFound => ErrorBody::not_found("Cart not found"),
                CartError::ItemNotFound(_) => ErrorBody::not_found("Product not found in cart"),
                CartError::Repository(err) => repository_body(err),
            },
            Self::Checkout(err) => match err {
                CheckoutError::EmptyCart => {
                    ErrorBody::new(StatusCode::BAD_REQUEST, "empty_cart", "Cart is empty")
                }
                CheckoutError::InsufficientStock {
                    product,
                    name,
                    available,
                    requested,
                } => {
                    let mut body = ErrorBody::new(
                        StatusCode::CONFLICT,
                        "insufficient_stock",
                        format!(
                            "Not enough stock for \"{name}\". Available: {available}, Requested: {requested}"
                        ),
                    );
                    body.details.insert("product".into(), json!(product));
                    body.details.insert("available".into(), json!(available));
                    body.details.insert("requested".into(), json!(requested));
                    body
                }
                CheckoutError::NoValidItems => ErrorBody::new(
                    StatusCode::BAD_REQUEST,
                    "no_valid_items",
                    "No valid products in cart",
                ),
                CheckoutError::TotalTooLarge => ErrorBody::validation(format!(
                    "Order total exceeds the maximum of {}",
                    bazaar_core::Price::MAX
                )),
                CheckoutError::Repository(err) => repository_body(err),
            },
            Self::InvalidProduct(err) => ErrorBody::validation(err.to_string()),
            Self::Unauthenticated(msg) => ErrorBody::unauthenticated(msg),
            Self::Forbidden(msg) => ErrorBody::new(StatusCode::FORBIDDEN, "forbidden", msg),
            Self::NotFound(msg) => ErrorBody::not_found(msg),
            Self::Validation(msg) => ErrorBody::validation(msg),
            Self::Conflict(msg) => ErrorBody::new(StatusCode::CONFLICT, "conflict", msg),
            Self::RateLimited => ErrorBody::new(
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                "Too many requests, please try again later",
            ),
            Self::Internal(_) => ErrorBody::internal(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = self.body();

        // Capture server errors to Sentry
        if body.status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let mut error = Map::new();
        error.insert("kind".into(), Value::from(body.kind));
        error.insert("message".into(), Value::from(body.message));
        error.extend(body.details);

        (body.status, Json(json!({ "error": error }))).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

/// JSON body extractor whose rejections are `validation_error` responses.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Path extractor whose rejections are `validation_error` responses.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;
    use bazaar_core::{ProductId, Quantity};

    use super::*;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::Validation("invalid input".to_string());
        assert_eq!(err.to_string(), "Validation error: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthenticated("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("test".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Validation("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::RateLimited),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Checkout(CheckoutError::EmptyCart)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Cart(CartError::CartNotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::UserAlreadyExists)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_insufficient_stock_body_carries_details() {
        let (status, body) = render(AppError::Checkout(CheckoutError::InsufficientStock {
            product: ProductId::new(3),
            name: "Lamp".to_string(),
            available: 1,
            requested: Quantity::new(2).unwrap(),
        }))
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["kind"], "insufficient_stock");
        assert_eq!(body["error"]["product"], 3);
        assert_eq!(body["error"]["available"], 1);
        assert_eq!(body["error"]["requested"], 2);
        assert_eq!(
            body["error"]["message"],
            "Not enough stock for \"Lamp\". Available: 1, Requested: 2"
        );
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let (status, body) = render(AppError::Database(RepositoryError::DataCorruption(
            "secret table layout".to_string(),
        )))
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["kind"], "internal");
        assert_eq!(body["error"]["message"], "Internal server error");
    }

    #[tokio::test]
    async fn test_login_failures_are_generic() {
        let (status, body) = render(AppError::Auth(AuthError::InvalidCredentials)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["kind"], "unauthenticated");
        assert_eq!(body["error"]["message"], "Invalid credentials");
    }

    #[tokio::test]
    async fn test_empty_and_dangling_cart_kinds() {
        let (_, body) = render(AppError::Checkout(CheckoutError::NoValidItems)).await;
        assert_eq!(body["error"]["kind"], "no_valid_items");

        let (_, body) = render(AppError::Checkout(CheckoutError::EmptyCart)).await;
        assert_eq!(body["error"]["kind"], "empty_cart");
    }

    #[tokio::test]
    async fn test_oversized_total_is_a_validation_error() {
        let (status, body) = render(AppError::Checkout(CheckoutError::TotalTooLarge)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["kind"], "validation_error");
        assert_eq!(
            body["error"]["message"],
            "Order total exceeds the maximum of 9999999999.99"
        );
    }
}
