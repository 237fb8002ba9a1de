//! API request and response types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Default page size for contact listings
pub const DEFAULT_PAGE_LIMIT: i64 = 10;
/// Upper bound on page size
pub const MAX_PAGE_LIMIT: i64 = 100;
/// Default look-ahead for upcoming birthdays
pub const DEFAULT_BIRTHDAY_WINDOW_DAYS: u32 = 7;
/// Upper bound on the birthday look-ahead
pub const MAX_BIRTHDAY_WINDOW_DAYS: u32 = 366;

// ============================================================================
// Authentication Types
// ============================================================================

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// OAuth2 password-grant login form
///
/// The `username` field carries the account email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Access + refresh token pair issued on login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

/// Access token issued from a refresh token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Plain acknowledgement message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub msg: String,
}

impl MessageResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}

/// Current user response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub is_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Avatar upload result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvatarResponse {
    pub filename: String,
    pub url: String,
}

// ============================================================================
// Contact Types
// ============================================================================

/// Contact create/replace request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub birthday: NaiveDate,
    #[serde(default)]
    pub additional_data: Option<String>,
}

/// Contact response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub birthday: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_data: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// List of contacts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactListResponse {
    pub contacts: Vec<ContactResponse>,
}

/// Offset pagination query (`?skip=&limit=`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaginationQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl PaginationQuery {
    /// Resolve defaults and clamp to sane bounds, returning `(skip, limit)`
    pub fn normalize(&self) -> (i64, i64) {
        let skip = self.skip.unwrap_or(0).max(0);
        let limit = self
            .limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT);
        (skip, limit)
    }
}

/// Contact search query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl SearchQuery {
    pub fn page(&self) -> PaginationQuery {
        PaginationQuery {
            skip: self.skip,
            limit: self.limit,
        }
    }
}

/// Upcoming birthdays query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BirthdayQuery {
    pub days: Option<u32>,
}

impl BirthdayQuery {
    pub fn window_days(&self) -> u32 {
        self.days
            .unwrap_or(DEFAULT_BIRTHDAY_WINDOW_DAYS)
            .min(MAX_BIRTHDAY_WINDOW_DAYS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, None, (0, 10))]
    #[case(Some(-5), Some(0), (0, 1))]
    #[case(Some(20), Some(500), (20, 100))]
    #[case(Some(3), Some(25), (3, 25))]
    fn test_pagination_normalize(
        #[case] skip: Option<i64>,
        #[case] limit: Option<i64>,
        #[case] expected: (i64, i64),
    ) {
        let query = PaginationQuery { skip, limit };
        assert_eq!(query.normalize(), expected);
    }

    #[test]
    fn test_birthday_window_defaults_and_caps() {
        assert_eq!(BirthdayQuery::default().window_days(), 7);
        assert_eq!(BirthdayQuery { days: Some(1000) }.window_days(), 366);
    }

    #[test]
    fn test_contact_request_additional_data_optional() {
        let json = r#"{
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": "ada@example.com",
            "phone_number": "+44 20 7946 0000",
            "birthday": "1815-12-10"
        }"#;
        let req: ContactRequest = serde_json::from_str(json).unwrap();
        assert!(req.additional_data.is_none());
        assert_eq!(req.birthday, NaiveDate::from_ymd_opt(1815, 12, 10).unwrap());
    }

    #[test]
    fn test_search_query_pagination() {
        let json = r#"{"query": "ada", "skip": 2}"#;
        let q: SearchQuery = serde_json::from_str(json).unwrap();
        assert_eq!(q.query, "ada");
        assert_eq!(q.page().normalize(), (2, 10));
    }
}
