//! User store collaborator
//!
//! The auth gateway talks to the users table through [`UserStore`], so it
//! can run against PostgreSQL in production and an in-memory map in
//! tests and local runs.

use crate::repositories::user::{EMAIL_UNIQUE_CONSTRAINT, TOKEN_UNIQUE_CONSTRAINT};
use crate::repositories::{CreateUser, UserRecord, UserRepository};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Store failures the gateway needs to tell apart
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,

    #[error("verification token collision")]
    DuplicateToken,

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Persistence operations on users
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Insert an unverified user; unique violations map to the `Duplicate*` variants
    async fn create(&self, input: CreateUser) -> Result<UserRecord, StoreError>;

    /// Atomically find the user holding `token`, mark it verified and active,
    /// and clear the token
    async fn consume_verification_token(&self, token: &str)
        -> Result<Option<UserRecord>, StoreError>;

    async fn mark_verified(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError>;

    async fn set_avatar_url(&self, id: Uuid, url: &str) -> Result<Option<UserRecord>, StoreError>;
}

/// PostgreSQL-backed user store
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map unique-constraint violations onto store errors
fn classify(err: anyhow::Error) -> StoreError {
    if let Some(sqlx::Error::Database(db_err)) = err.downcast_ref::<sqlx::Error>() {
        if db_err.is_unique_violation() {
            match db_err.constraint() {
                Some(EMAIL_UNIQUE_CONSTRAINT) => return StoreError::DuplicateEmail,
                Some(TOKEN_UNIQUE_CONSTRAINT) => return StoreError::DuplicateToken,
                _ => {}
            }
        }
    }
    StoreError::Backend(err)
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(UserRepository::find_by_email(&self.pool, email).await?)
    }

    async fn create(&self, input: CreateUser) -> Result<UserRecord, StoreError> {
        UserRepository::create(&self.pool, &input)
            .await
            .map_err(classify)
    }

    async fn consume_verification_token(
        &self,
        token: &str,
    ) -> Result<Option<UserRecord>, StoreError> {
        Ok(UserRepository::consume_verification_token(&self.pool, token).await?)
    }

    async fn mark_verified(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        Ok(UserRepository::mark_verified(&self.pool, id).await?)
    }

    async fn set_avatar_url(&self, id: Uuid, url: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(UserRepository::set_avatar_url(&self.pool, id, url).await?)
    }
}

/// In-memory user store
///
/// A single async mutex guards the map, which gives every operation the
/// same atomicity the SQL statements have.
#[derive(Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<Mutex<HashMap<Uuid, UserRecord>>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users
    pub async fn len(&self) -> usize {
        self.users.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.lock().await.is_empty()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.lock().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn create(&self, input: CreateUser) -> Result<UserRecord, StoreError> {
        let mut users = self.users.lock().await;

        if users.values().any(|u| u.email == input.email) {
            return Err(StoreError::DuplicateEmail);
        }
        if users
            .values()
            .any(|u| u.verification_token.as_deref() == Some(input.verification_token.as_str()))
        {
            return Err(StoreError::DuplicateToken);
        }

        let user = UserRecord {
            id: Uuid::new_v4(),
            email: input.email,
            password_hash: input.password_hash,
            is_verified: false,
            is_active: false,
            verification_token: Some(input.verification_token),
            avatar_url: None,
            created_at: Utc::now(),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn consume_verification_token(
        &self,
        token: &str,
    ) -> Result<Option<UserRecord>, StoreError> {
        let mut users = self.users.lock().await;
        let user = users
            .values_mut()
            .find(|u| u.verification_token.as_deref() == Some(token));

        Ok(user.map(|u| {
            u.is_verified = true;
            u.is_active = true;
            u.verification_token = None;
            u.clone()
        }))
    }

    async fn mark_verified(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        let mut users = self.users.lock().await;
        Ok(users.get_mut(&id).map(|u| {
            u.is_verified = true;
            u.clone()
        }))
    }

    async fn set_avatar_url(&self, id: Uuid, url: &str) -> Result<Option<UserRecord>, StoreError> {
        let mut users = self.users.lock().await;
        Ok(users.get_mut(&id).map(|u| {
            u.avatar_url = Some(url.to_string());
            u.clone()
        }))
    }
}
