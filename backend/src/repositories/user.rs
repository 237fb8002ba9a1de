//! User repository for database operations

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Unique constraint on `users.email`
pub const EMAIL_UNIQUE_CONSTRAINT: &str = "users_email_key";
/// Unique constraint on `users.verification_token`
pub const TOKEN_UNIQUE_CONSTRAINT: &str = "users_verification_token_key";

const USER_COLUMNS: &str = "id, email, password_hash, is_verified, is_active, \
                            verification_token, avatar_url, created_at";

/// User record from database
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub is_verified: bool,
    pub is_active: bool,
    pub verification_token: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating an unverified user
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub password_hash: String,
    pub verification_token: String,
}

/// User repository for database operations
pub struct UserRepository;

impl UserRepository {
    /// Create a new unverified user
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<UserRecord> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            INSERT INTO users (email, password_hash, verification_token)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&input.email)
        .bind(&input.password_hash)
        .bind(&input.verification_token)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Find user by email
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE email = $1
            "#
        ))
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Consume a verification token
    ///
    /// Lookup and clear happen in one statement, so concurrent callers
    /// with the same token see exactly one row between them.
    pub async fn consume_verification_token(
        pool: &PgPool,
        token: &str,
    ) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            UPDATE users SET
                is_verified = TRUE,
                is_active = TRUE,
                verification_token = NULL,
                updated_at = NOW()
            WHERE verification_token = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(token)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Mark a user verified by id
    pub async fn mark_verified(pool: &PgPool, id: Uuid) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            UPDATE users SET
                is_verified = TRUE,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Update the avatar URL
    pub async fn set_avatar_url(pool: &PgPool, id: Uuid, url: &str) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            UPDATE users SET
                avatar_url = $2,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(url)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }
}
