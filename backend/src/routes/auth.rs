//! Authentication routes
//!
//! Registration, email verification, login and access-token refresh.
//!
//! # Performance
//!
//! - Uses pre-computed JWT keys from AppState (no per-request derivation)
//! - Password hashing runs on the blocking thread pool

use crate::auth::BearerToken;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use address_book_shared::validation::{validate_email, validate_password};
use address_book_shared::{
    AccessTokenResponse, AuthError, LoginForm, MessageResponse, RegisterRequest, TokenResponse,
};
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Form, Json, Router,
};

pub const REGISTERED_MESSAGE: &str =
    "User created. Please check your email to verify your account.";
pub const VERIFIED_MESSAGE: &str = "Account verified successfully";

/// Create auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register/", post(register))
        .route("/verify/:token", get(verify))
        .route("/token/", post(login))
        .route("/token/refresh/", post(refresh_token))
}

/// Register a new user
///
/// POST /register/
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let email = req.email.trim();
    validate_email(email).map_err(ApiError::Validation)?;
    validate_password(&req.password).map_err(ApiError::Validation)?;

    state.auth().register(email, &req.password).await?;
    Ok(Json(MessageResponse::new(REGISTERED_MESSAGE)))
}

/// Verify an account with the mailed token
///
/// GET /verify/{token}
async fn verify(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.auth().verify(&token).await?;
    Ok(Json(MessageResponse::new(VERIFIED_MESSAGE)))
}

/// Login with a form-encoded `username` (the email) and `password`
///
/// POST /token/
async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> ApiResult<Json<TokenResponse>> {
    let tokens = state
        .auth()
        .login(form.username.trim(), &form.password)
        .await?;
    Ok(Json(tokens))
}

/// Exchange a refresh token (sent as the bearer credential) for a new access token
///
/// POST /token/refresh/
async fn refresh_token(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> ApiResult<Json<AccessTokenResponse>> {
    let refreshed = state
        .auth()
        .refresh_access_token(&token)
        .await
        .map_err(|err| match err {
            ApiError::Auth(AuthError::InvalidToken) => {
                ApiError::Unauthorized("Invalid refresh token".to_string())
            }
            other => other,
        })?;
    Ok(Json(refreshed))
}
