//! Token issuance and validation
//!
//! Provides access and refresh JWTs signed with a server-held HMAC secret,
//! plus opaque email-verification tokens. Keys are pre-computed once and
//! shared behind an `Arc`.

use address_book_shared::AuthError;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Entropy of a verification token in bytes (256 bits)
const VERIFICATION_TOKEN_BYTES: usize = 32;

/// JWT claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user email)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Failures while building the service or signing a token
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("signing secret must not be empty")]
    EmptySecret,

    #[error("failed to sign token: {0}")]
    Encode(#[from] jsonwebtoken::errors::Error),
}

/// Which of the two signed tokens to issue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Access,
    Refresh,
}

/// Pre-computed keys, expensive enough to build once at startup
#[derive(Clone)]
struct TokenKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl TokenKeys {
    fn new(secret: &str) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        }
    }
}

/// Token service for verification, access and refresh tokens
///
/// Cloning is cheap: keys are behind `Arc` and the rest is `Copy` data.
#[derive(Clone)]
pub struct TokenService {
    keys: TokenKeys,
    algorithm: Algorithm,
    validation: Arc<Validation>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &self.algorithm)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Create a token service
    ///
    /// Only HMAC algorithms are accepted since the secret is symmetric.
    pub fn new(
        secret: &str,
        algorithm: &str,
        access_token_expiry_secs: i64,
        refresh_token_expiry_secs: i64,
    ) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }

        let algorithm = match Algorithm::from_str(algorithm) {
            Ok(alg @ (Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)) => alg,
            _ => return Err(TokenError::UnsupportedAlgorithm(algorithm.to_string())),
        };

        let mut validation = Validation::new(algorithm);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            keys: TokenKeys::new(secret),
            algorithm,
            validation: Arc::new(validation),
            access_ttl: Duration::seconds(access_token_expiry_secs),
            refresh_ttl: Duration::seconds(refresh_token_expiry_secs),
        })
    }

    /// Generate an opaque, URL-safe verification token
    pub fn issue_verification_token(&self) -> String {
        let mut bytes = [0u8; VERIFICATION_TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Issue a short-lived access token
    #[inline]
    pub fn issue_access_token(&self, subject: &str) -> Result<String, TokenError> {
        self.issue(subject, TokenKind::Access)
    }

    /// Issue a long-lived refresh token
    #[inline]
    pub fn issue_refresh_token(&self, subject: &str) -> Result<String, TokenError> {
        self.issue(subject, TokenKind::Refresh)
    }

    fn issue(&self, subject: &str, kind: TokenKind) -> Result<String, TokenError> {
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };

        let claims = Claims {
            sub: subject.to_string(),
            exp: (Utc::now() + ttl).timestamp(),
        };

        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        Ok(encode(&Header::new(self.algorithm), claims, &self.keys.encoding)?)
    }

    /// Verify signature, algorithm and expiry, returning the claims
    ///
    /// Every failure collapses into `AuthError::InvalidToken`.
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.keys.decoding, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "token rejected");
            AuthError::InvalidToken
        })?;

        if data.claims.sub.is_empty() {
            return Err(AuthError::InvalidToken);
        }

        Ok(data.claims)
    }
}
