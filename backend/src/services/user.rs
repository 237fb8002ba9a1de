//! User profile and avatar management

use crate::error::ApiError;
use crate::integrations::AvatarUploader;
use crate::repositories::UserRecord;
use crate::services::user_store::UserStore;
use address_book_shared::{AvatarResponse, UserResponse};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Convert a stored user into its public representation
pub fn to_response(user: &UserRecord) -> UserResponse {
    UserResponse {
        id: user.id.to_string(),
        email: user.email.clone(),
        is_verified: user.is_verified,
        avatar_url: user.avatar_url.clone(),
    }
}

/// User service
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
    uploader: Arc<dyn AvatarUploader>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>, uploader: Arc<dyn AvatarUploader>) -> Self {
        Self { users, uploader }
    }

    /// Upload a new avatar for `target_id` on behalf of `current`
    ///
    /// Users may only replace their own avatar.
    #[instrument(skip(self, current, bytes), fields(current_id = %current.id))]
    pub async fn upload_avatar(
        &self,
        current: &UserRecord,
        target_id: Uuid,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<AvatarResponse, ApiError> {
        if current.id != target_id {
            return Err(ApiError::Forbidden(
                "Cannot change another user's avatar".to_string(),
            ));
        }
        if bytes.is_empty() {
            return Err(ApiError::Validation("Uploaded file is empty".to_string()));
        }

        let url = self.uploader.upload(target_id, filename, bytes).await?;

        self.users
            .set_avatar_url(target_id, &url)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        info!("avatar updated");
        Ok(AvatarResponse {
            filename: filename.to_string(),
            url,
        })
    }
}
