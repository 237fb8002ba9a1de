//! Database repositories
//!
//! Provides data access layer for database operations.

pub mod contact;
pub mod user;

pub use contact::{ContactInput, ContactRecord, ContactRepository};
pub use user::{CreateUser, UserRecord, UserRepository};
