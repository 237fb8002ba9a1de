//! Contact repository for database operations
//!
//! Every query is scoped by `owner_id`; contacts are never reachable
//! through another user's id.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Unique constraint on `(contacts.owner_id, contacts.email)`
pub const OWNER_EMAIL_UNIQUE_CONSTRAINT: &str = "contacts_owner_email_key";

const CONTACT_COLUMNS: &str = "id, owner_id, first_name, last_name, email, phone_number, \
                               birthday, additional_data, created_at";

/// Contact record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ContactRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub birthday: NaiveDate,
    pub additional_data: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating or replacing a contact
#[derive(Debug, Clone)]
pub struct ContactInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub birthday: NaiveDate,
    pub additional_data: Option<String>,
}

/// Contact repository for database operations
pub struct ContactRepository;

impl ContactRepository {
    /// Create a contact owned by `owner_id`
    pub async fn create(pool: &PgPool, owner_id: Uuid, input: &ContactInput) -> Result<ContactRecord> {
        let record = sqlx::query_as::<_, ContactRecord>(&format!(
            r#"
            INSERT INTO contacts
                (owner_id, first_name, last_name, email, phone_number, birthday, additional_data)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {CONTACT_COLUMNS}
            "#
        ))
        .bind(owner_id)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.email)
        .bind(&input.phone_number)
        .bind(input.birthday)
        .bind(&input.additional_data)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// List a page of contacts ordered by name
    pub async fn list(
        pool: &PgPool,
        owner_id: Uuid,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<ContactRecord>> {
        let records = sqlx::query_as::<_, ContactRecord>(&format!(
            r#"
            SELECT {CONTACT_COLUMNS}
            FROM contacts
            WHERE owner_id = $1
            ORDER BY last_name, first_name, id
            OFFSET $2
            LIMIT $3
            "#
        ))
        .bind(owner_id)
        .bind(skip)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Get a contact by ID
    pub async fn get_by_id(pool: &PgPool, owner_id: Uuid, id: Uuid) -> Result<Option<ContactRecord>> {
        let record = sqlx::query_as::<_, ContactRecord>(&format!(
            r#"
            SELECT {CONTACT_COLUMNS}
            FROM contacts
            WHERE id = $1 AND owner_id = $2
            "#
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// Replace every editable field of a contact
    pub async fn update(
        pool: &PgPool,
        owner_id: Uuid,
        id: Uuid,
        input: &ContactInput,
    ) -> Result<Option<ContactRecord>> {
        let record = sqlx::query_as::<_, ContactRecord>(&format!(
            r#"
            UPDATE contacts SET
                first_name = $3,
                last_name = $4,
                email = $5,
                phone_number = $6,
                birthday = $7,
                additional_data = $8,
                updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING {CONTACT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(owner_id)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.email)
        .bind(&input.phone_number)
        .bind(input.birthday)
        .bind(&input.additional_data)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// Delete a contact, returning the removed row
    pub async fn delete(pool: &PgPool, owner_id: Uuid, id: Uuid) -> Result<Option<ContactRecord>> {
        let record = sqlx::query_as::<_, ContactRecord>(&format!(
            r#"
            DELETE FROM contacts
            WHERE id = $1 AND owner_id = $2
            RETURNING {CONTACT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// Case-insensitive substring search over names and email
    pub async fn search(
        pool: &PgPool,
        owner_id: Uuid,
        query: &str,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<ContactRecord>> {
        let pattern = format!("%{}%", escape_like(query));

        let records = sqlx::query_as::<_, ContactRecord>(&format!(
            r#"
            SELECT {CONTACT_COLUMNS}
            FROM contacts
            WHERE owner_id = $1
              AND (first_name ILIKE $2 ESCAPE '\'
                   OR last_name ILIKE $2 ESCAPE '\'
                   OR email ILIKE $2 ESCAPE '\')
            ORDER BY last_name, first_name, id
            OFFSET $3
            LIMIT $4
            "#
        ))
        .bind(owner_id)
        .bind(pattern)
        .bind(skip)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// All contacts of an owner (used for birthday projection)
    pub async fn list_all(pool: &PgPool, owner_id: Uuid) -> Result<Vec<ContactRecord>> {
        let records = sqlx::query_as::<_, ContactRecord>(&format!(
            r#"
            SELECT {CONTACT_COLUMNS}
            FROM contacts
            WHERE owner_id = $1
            "#
        ))
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }
}

/// Escape LIKE metacharacters so user input matches literally
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("ada"), "ada");
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }
}
