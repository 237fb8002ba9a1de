//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! repositories and external systems.

pub mod auth;
pub mod contact;
pub mod user;
pub mod user_store;

pub use auth::AuthService;
pub use contact::ContactService;
pub use user::UserService;
pub use user_store::{MemoryUserStore, PgUserStore, StoreError, UserStore};
