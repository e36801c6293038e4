//! Authentication route handlers.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{ApiJson, Result};
use crate::middleware::RequireAuth;
use crate::models::User;
use crate::services::AuthService;
use crate::state::AppState;

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub user: User,
}

/// `POST /api/auth/createuser`
#[instrument(skip(state, body), fields(email = %body.email))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<Json<RegisterResponse>> {
    let session = AuthService::new(state.pool(), state.tokens())
        .register(&body.name, &body.email, &body.password)
        .await?;

    Ok(Json(RegisterResponse {
        success: true,
        token: session.token,
    }))
}

/// `POST /api/auth/login`
#[instrument(skip(state, body), fields(email = %body.email))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let session = AuthService::new(state.pool(), state.tokens())
        .login(&body.email, &body.password)
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "login failed"))?;

    Ok(Json(LoginResponse {
        success: true,
        token: session.token,
        user: session.user,
    }))
}

/// `POST /api/auth/getuser`
///
/// Returns the token holder's profile. Clients call this to revalidate a
/// stored token.
pub async fn current_user(RequireAuth(user): RequireAuth) -> Json<User> {
    Json(user)
}
