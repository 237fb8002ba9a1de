//! Auth gateway: registration, verification, login and token refresh
//!
//! Accounts move `Unregistered -> Unverified -> Verified` and never back.
//!
//! # Performance
//!
//! - Password hashing/verification runs on the blocking thread pool
//! - The token service holds pre-computed keys and is shared by reference

use crate::auth::{PasswordService, TokenService};
use crate::error::ApiError;
use crate::integrations::{MailMessage, Mailer};
use crate::repositories::{CreateUser, UserRecord};
use crate::services::user_store::UserStore;
use address_book_shared::{AccessTokenResponse, AuthError, TokenResponse};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// `token_type` reported alongside issued tokens
pub const TOKEN_TYPE: &str = "bearer";

/// Subject line of the verification mail
pub const VERIFICATION_SUBJECT: &str = "Email Verification";

/// Build the verification mail for a freshly registered user
pub fn verification_message(email: &str, token: &str) -> MailMessage {
    MailMessage {
        to: email.to_string(),
        subject: VERIFICATION_SUBJECT.to_string(),
        body: format!("Your verification token is: {}", token),
    }
}

/// Authentication gateway
///
/// Cheap to clone; every collaborator is behind an `Arc`.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    mailer: Arc<dyn Mailer>,
    tokens: TokenService,
    passwords: PasswordService,
    /// Digest checked against when the email is unknown, so a miss costs
    /// the same as a wrong password
    dummy_hash: Arc<OnceCell<String>>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        mailer: Arc<dyn Mailer>,
        tokens: TokenService,
        passwords: PasswordService,
    ) -> Self {
        Self {
            users,
            mailer,
            tokens,
            passwords,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// The user store this gateway resolves against
    pub fn users(&self) -> &Arc<dyn UserStore> {
        &self.users
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Register a new, unverified user and mail them a verification token
    ///
    /// Input is expected to have passed boundary validation already.
    #[instrument(skip_all, fields(email = %email))]
    pub async fn register(&self, email: &str, password: &str) -> Result<UserRecord, ApiError> {
        if self.users.find_by_email(email).await?.is_some() {
            return Err(AuthError::DuplicateEmail.into());
        }

        let password_hash = self.passwords.hash_async(password.to_string()).await?;

        let verification_token = self.tokens.issue_verification_token();
        if verification_token.is_empty() {
            return Err(AuthError::TokenGeneration.into());
        }

        // A concurrent registration of the same email surfaces here as a
        // unique violation and maps to DuplicateEmail
        let user = self
            .users
            .create(CreateUser {
                email: email.to_string(),
                password_hash,
                verification_token: verification_token.clone(),
            })
            .await?;

        self.mailer
            .send(verification_message(&user.email, &verification_token))
            .await?;

        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Consume a verification token, moving its owner to verified
    #[instrument(skip_all)]
    pub async fn verify(&self, token: &str) -> Result<UserRecord, ApiError> {
        if token.is_empty() {
            return Err(AuthError::InvalidToken.into());
        }

        let user = self
            .users
            .consume_verification_token(token)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        info!(user_id = %user.id, "account verified");
        Ok(user)
    }

    /// Check credentials and issue an access + refresh token pair
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    #[instrument(skip_all, fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, ApiError> {
        let user = self.users.find_by_email(email).await?;

        let hash = match &user {
            Some(user) => user.password_hash.clone(),
            None => self.dummy_hash().await?,
        };

        let valid = PasswordService::verify_async(password.to_string(), hash).await?;
        let user = match user {
            Some(user) if valid => user,
            _ => {
                warn!("failed login attempt");
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        let access_token = self.tokens.issue_access_token(&user.email).map_err(anyhow::Error::from)?;
        let refresh_token = self.tokens.issue_refresh_token(&user.email).map_err(anyhow::Error::from)?;

        info!(user_id = %user.id, "login succeeded");
        Ok(TokenResponse {
            access_token,
            refresh_token,
            token_type: TOKEN_TYPE.to_string(),
        })
    }

    /// Mint a new access token from a refresh token
    ///
    /// The refresh token stays valid until its own expiry.
    #[instrument(skip_all)]
    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<AccessTokenResponse, ApiError> {
        let claims = self.tokens.decode(refresh_token)?;
        let access_token = self.tokens.issue_access_token(&claims.sub).map_err(anyhow::Error::from)?;

        Ok(AccessTokenResponse {
            access_token,
            token_type: TOKEN_TYPE.to_string(),
        })
    }

    /// Resolve the user an access token was issued to
    pub async fn resolve_current_user(&self, access_token: &str) -> Result<UserRecord, ApiError> {
        let claims = self
            .tokens
            .decode(access_token)
            .map_err(|_| AuthError::Unauthenticated)?;

        let user = self
            .users
            .find_by_email(&claims.sub)
            .await?
            .ok_or(AuthError::Unauthenticated)?;

        Ok(user)
    }

    /// Administrative verification by user id (no token involved)
    #[instrument(skip(self))]
    pub async fn admin_verify(&self, user_id: Uuid) -> Result<UserRecord, ApiError> {
        let user = self
            .users
            .mark_verified(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        info!("user verified by administrator");
        Ok(user)
    }

    /// Hashed once on the blocking pool, then shared by every clone
    async fn dummy_hash(&self) -> Result<String, ApiError> {
        let hash = self
            .dummy_hash
            .get_or_try_init(|| {
                self.passwords
                    .hash_async("dummy-password-for-timing".to_string())
            })
            .await?;
        Ok(hash.clone())
    }
}
