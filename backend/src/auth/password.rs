//! Password hashing using bcrypt
//!
//! Provides secure password hashing and verification.
//!
//! # Performance Considerations
//!
//! bcrypt is intentionally CPU-intensive. Request handlers should use the
//! `*_async` variants, which run on tokio's blocking pool.

use anyhow::Result;

/// Password hashing service
///
/// The salt is generated per hash and embedded in the digest, so the
/// digest alone is enough to verify a password later. Digest comparison
/// inside `bcrypt::verify` is constant-time.
#[derive(Debug, Clone, Copy)]
pub struct PasswordService {
    cost: u32,
}

impl Default for PasswordService {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordService {
    /// Create a hasher with the given bcrypt work factor (4..=31)
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a password using bcrypt (blocking operation)
    pub fn hash(&self, password: &str) -> Result<String> {
        bcrypt::hash(password, self.cost)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))
    }

    /// Hash a password asynchronously (non-blocking)
    pub async fn hash_async(&self, password: String) -> Result<String> {
        let service = *self;
        tokio::task::spawn_blocking(move || service.hash(&password))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }

    /// Verify a password against a hash (blocking operation)
    ///
    /// Returns an error only if the stored digest is malformed.
    pub fn verify(password: &str, hash: &str) -> Result<bool> {
        bcrypt::verify(password, hash).map_err(|e| anyhow::anyhow!("Invalid hash format: {}", e))
    }

    /// Verify a password asynchronously (non-blocking)
    pub async fn verify_async(password: String, hash: String) -> Result<bool> {
        tokio::task::spawn_blocking(move || Self::verify(&password, &hash))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }
}
