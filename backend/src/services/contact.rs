//! Contact service
//!
//! Provides business logic for the address book:
//! - CRUD scoped to the owning user
//! - Name/email search
//! - Upcoming birthday projection

use crate::error::ApiError;
use crate::repositories::contact::OWNER_EMAIL_UNIQUE_CONSTRAINT;
use crate::repositories::{ContactInput, ContactRecord, ContactRepository};
use address_book_shared::{ContactRequest, ContactResponse};
use chrono::{Datelike, NaiveDate};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

/// Convert a stored contact into its public representation
pub fn to_response(record: ContactRecord) -> ContactResponse {
    ContactResponse {
        id: record.id.to_string(),
        first_name: record.first_name,
        last_name: record.last_name,
        email: record.email,
        phone_number: record.phone_number,
        birthday: record.birthday,
        additional_data: record.additional_data,
        created_at: record.created_at,
    }
}

impl From<ContactRequest> for ContactInput {
    fn from(req: ContactRequest) -> Self {
        Self {
            first_name: req.first_name.trim().to_string(),
            last_name: req.last_name.trim().to_string(),
            email: req.email.trim().to_string(),
            phone_number: req.phone_number.trim().to_string(),
            birthday: req.birthday,
            additional_data: req.additional_data,
        }
    }
}

/// Next occurrence of `birthday` on or after `today`
///
/// February 29 birthdays fall on February 28 in non-leap years.
pub fn next_birthday(birthday: NaiveDate, today: NaiveDate) -> NaiveDate {
    let in_year = |year: i32| {
        NaiveDate::from_ymd_opt(year, birthday.month(), birthday.day())
            .or_else(|| NaiveDate::from_ymd_opt(year, 2, 28))
            .unwrap_or(today)
    };

    let this_year = in_year(today.year());
    if this_year >= today {
        this_year
    } else {
        in_year(today.year() + 1)
    }
}

/// Contacts whose next birthday falls within `days` of `today`, soonest first
pub fn upcoming_birthdays(
    contacts: Vec<ContactRecord>,
    today: NaiveDate,
    days: u32,
) -> Vec<ContactRecord> {
    let mut upcoming: Vec<(i64, ContactRecord)> = contacts
        .into_iter()
        .filter_map(|contact| {
            let until = (next_birthday(contact.birthday, today) - today).num_days();
            (until <= i64::from(days)).then_some((until, contact))
        })
        .collect();

    upcoming.sort_by(|(a_days, a), (b_days, b)| {
        a_days
            .cmp(b_days)
            .then_with(|| a.last_name.cmp(&b.last_name))
            .then_with(|| a.first_name.cmp(&b.first_name))
    });

    upcoming.into_iter().map(|(_, contact)| contact).collect()
}

fn is_duplicate_contact(err: &anyhow::Error) -> bool {
    match err.downcast_ref::<sqlx::Error>() {
        Some(sqlx::Error::Database(db_err)) => {
            db_err.is_unique_violation()
                && db_err.constraint() == Some(OWNER_EMAIL_UNIQUE_CONSTRAINT)
        }
        _ => false,
    }
}

fn map_write_error(err: anyhow::Error) -> ApiError {
    if is_duplicate_contact(&err) {
        ApiError::Conflict("Contact with this email already exists".to_string())
    } else {
        ApiError::Internal(err)
    }
}

fn not_found() -> ApiError {
    ApiError::NotFound("Contact not found".to_string())
}

/// Contact service for business logic
pub struct ContactService;

impl ContactService {
    /// Create a contact owned by `owner_id`
    pub async fn create(
        pool: &PgPool,
        owner_id: Uuid,
        input: ContactInput,
    ) -> Result<ContactRecord, ApiError> {
        let record = ContactRepository::create(pool, owner_id, &input)
            .await
            .map_err(map_write_error)?;

        info!(contact_id = %record.id, "contact created");
        Ok(record)
    }

    /// List a page of the owner's contacts
    pub async fn list(
        pool: &PgPool,
        owner_id: Uuid,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<ContactRecord>, ApiError> {
        ContactRepository::list(pool, owner_id, skip, limit)
            .await
            .map_err(ApiError::Internal)
    }

    pub async fn get(pool: &PgPool, owner_id: Uuid, id: Uuid) -> Result<ContactRecord, ApiError> {
        ContactRepository::get_by_id(pool, owner_id, id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(not_found)
    }

    /// Replace a contact's fields
    pub async fn update(
        pool: &PgPool,
        owner_id: Uuid,
        id: Uuid,
        input: ContactInput,
    ) -> Result<ContactRecord, ApiError> {
        ContactRepository::update(pool, owner_id, id, &input)
            .await
            .map_err(map_write_error)?
            .ok_or_else(not_found)
    }

    /// Delete a contact, returning what was removed
    pub async fn delete(pool: &PgPool, owner_id: Uuid, id: Uuid) -> Result<ContactRecord, ApiError> {
        let record = ContactRepository::delete(pool, owner_id, id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(not_found)?;

        info!(contact_id = %record.id, "contact deleted");
        Ok(record)
    }

    pub async fn search(
        pool: &PgPool,
        owner_id: Uuid,
        query: &str,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<ContactRecord>, ApiError> {
        ContactRepository::search(pool, owner_id, query.trim(), skip, limit)
            .await
            .map_err(ApiError::Internal)
    }

    /// Contacts with a birthday in the next `days` days counted from `today`
    pub async fn upcoming_birthdays(
        pool: &PgPool,
        owner_id: Uuid,
        today: NaiveDate,
        days: u32,
    ) -> Result<Vec<ContactRecord>, ApiError> {
        let contacts = ContactRepository::list_all(pool, owner_id)
            .await
            .map_err(ApiError::Internal)?;

        Ok(upcoming_birthdays(contacts, today, days))
    }
}
