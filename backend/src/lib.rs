//! Address Book Backend Library
//!
//! Contact management REST API with email-verified accounts and
//! JWT authentication. Modules are public for integration tests.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod integrations;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
