//! User routes

use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResult};
use crate::services::user;
use crate::state::AppState;
use address_book_shared::{AvatarResponse, UserResponse};
use axum::{
    extract::{Multipart, Path, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

/// Multipart field carrying the image
const AVATAR_FIELD: &str = "file";

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/me", get(me))
        .route("/users/:user_id/avatar", post(upload_avatar))
}

/// GET /users/me
async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(user::to_response(&user))
}

/// Replace the caller's avatar
///
/// POST /users/{user_id}/avatar
async fn upload_avatar(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Path(user_id): Path<Uuid>,
    mut multipart: Multipart,
) -> ApiResult<Json<AvatarResponse>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(AVATAR_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or("avatar").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {e}")))?;

        let avatar = state
            .users()
            .upload_avatar(&current, user_id, &filename, bytes.to_vec())
            .await?;
        return Ok(Json(avatar));
    }

    Err(ApiError::BadRequest("Missing file field".to_string()))
}
