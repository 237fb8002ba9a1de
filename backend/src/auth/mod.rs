//! Authentication module
//!
//! Provides bcrypt password hashing, JWT issuance and verification,
//! request extractors and the contact-creation rate limiter.

mod jwt;
mod middleware;
mod password;
pub mod rate_limit;

pub use jwt::{Claims, TokenError, TokenService};
pub use middleware::{BearerToken, CurrentUser};
pub use password::PasswordService;
pub use rate_limit::{ClientKey, RateLimiter};
