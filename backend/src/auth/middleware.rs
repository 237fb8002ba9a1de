//! Authentication extractors
//!
//! Provides Axum extractors for bearer tokens and the resolved current user.
//!
//! # Performance
//!
//! Uses pre-computed JWT keys from AppState to avoid expensive
//! key derivation on every request.

use crate::error::ApiError;
use crate::repositories::UserRecord;
use crate::state::AppState;
use address_book_shared::AuthError;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

/// Raw token taken from an `Authorization: Bearer <token>` header
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

/// Pull the bearer token out of request headers
pub(crate) fn bearer_from_parts(parts: &Parts) -> Result<String, ApiError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AuthError::Unauthenticated)?;

    // Auth schemes are case-insensitive
    let token = header
        .split_once(' ')
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::Unauthenticated)?;

    Ok(token.to_string())
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        bearer_from_parts(parts).map(BearerToken)
    }
}

/// Authenticated user resolved from the access token
///
/// Rejects with 401 when the header is missing or malformed, the token
/// fails verification, or its subject no longer exists.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserRecord);

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let token = bearer_from_parts(parts)?;
        let user = app_state.auth().resolve_current_user(&token).await?;
        Ok(CurrentUser(user))
    }
}
