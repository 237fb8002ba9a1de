//! Input validation functions
//!
//! Boundary rules applied once by the HTTP layer before any domain
//! object is built. Email format checks delegate to the `validator`
//! crate; the remaining rules are hand-written.

use crate::types::ContactRequest;
use regex_lite::Regex;
use std::sync::OnceLock;
use validator::ValidateEmail;

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 8;
/// bcrypt only consumes the first 72 bytes of its input
pub const MAX_PASSWORD_BYTES: usize = 72;

const MAX_EMAIL_LEN: usize = 255;
const MAX_NAME_LEN: usize = 100;
const MAX_ADDITIONAL_DATA_LEN: usize = 2000;

fn phone_regex() -> &'static Regex {
    static PHONE: OnceLock<Regex> = OnceLock::new();
    PHONE.get_or_init(|| {
        Regex::new(r"^\+?[0-9][0-9 ()\-.]{4,24}$").expect("phone regex is valid")
    })
}

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }
    if email.len() > MAX_EMAIL_LEN {
        return Err("Email too long".to_string());
    }
    if !email.validate_email() {
        return Err("Invalid email format".to_string());
    }
    Ok(())
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err("Password should be at least 8 characters long".to_string());
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err("Password must be at most 72 bytes".to_string());
    }
    Ok(())
}

/// Validate a phone number (digits with common separators, optional leading +)
pub fn validate_phone_number(phone: &str) -> Result<(), String> {
    if !phone_regex().is_match(phone.trim()) {
        return Err("Invalid phone number".to_string());
    }
    Ok(())
}

fn validate_name(field: &str, value: &str) -> Result<(), String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{} cannot be empty", field));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(format!("{} too long", field));
    }
    Ok(())
}

/// Validate a full contact payload
pub fn validate_contact(contact: &ContactRequest) -> Result<(), String> {
    validate_name("First name", &contact.first_name)?;
    validate_name("Last name", &contact.last_name)?;
    validate_email(&contact.email)?;
    validate_phone_number(&contact.phone_number)?;
    if let Some(extra) = &contact.additional_data {
        if extra.chars().count() > MAX_ADDITIONAL_DATA_LEN {
            return Err("Additional data too long".to_string());
        }
    }
    Ok(())
}

/// Validate a contact search term
pub fn validate_search_query(query: &str) -> Result<(), String> {
    if query.trim().is_empty() {
        return Err("Search query cannot be empty".to_string());
    }
    if query.chars().count() > MAX_NAME_LEN {
        return Err("Search query too long".to_string());
    }
    Ok(())
}
