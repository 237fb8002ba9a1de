//! Error types for the Address Book application

use thiserror::Error;

/// Authentication and token-lifecycle failures
///
/// Token decode failures are deliberately collapsed into a single
/// variant: callers never learn whether a token was expired, tampered
/// with or simply malformed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Failed to generate verification token")]
    TokenGeneration,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("Could not validate credentials")]
    Unauthenticated,

    #[error("Rate limit exceeded")]
    RateLimited,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_do_not_leak_token_state() {
        // Expired and tampered tokens share one message
        assert_eq!(AuthError::InvalidToken.to_string(), "Invalid token");
        assert_eq!(
            AuthError::Unauthenticated.to_string(),
            "Could not validate credentials"
        );
    }
}
