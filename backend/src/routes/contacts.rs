//! Contact routes
//!
//! Every handler requires an access token and only ever touches the
//! caller's own contacts.

use crate::auth::{ClientKey, CurrentUser};
use crate::error::{ApiError, ApiResult};
use crate::services::contact::{self, ContactService};
use crate::state::AppState;
use address_book_shared::validation::{validate_contact, validate_search_query};
use address_book_shared::{
    AuthError, BirthdayQuery, ContactListResponse, ContactRequest, ContactResponse,
    PaginationQuery, SearchQuery,
};
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

/// Create contact routes
pub fn contact_routes() -> Router<AppState> {
    Router::new()
        .route("/contacts/", get(list_contacts).post(create_contact))
        .route("/contacts/search/", get(search_contacts))
        .route("/contacts/upcoming_birthdays/", get(upcoming_birthdays))
        .route(
            "/contacts/:contact_id",
            get(get_contact).put(update_contact).delete(delete_contact),
        )
}

fn list_response(records: Vec<crate::repositories::ContactRecord>) -> Json<ContactListResponse> {
    Json(ContactListResponse {
        contacts: records.into_iter().map(contact::to_response).collect(),
    })
}

/// Create a contact
///
/// POST /contacts/
///
/// Limited per client address. Only authenticated requests with a valid
/// body count against the budget.
async fn create_contact(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ClientKey(client): ClientKey,
    Json(req): Json<ContactRequest>,
) -> ApiResult<Json<ContactResponse>> {
    validate_contact(&req).map_err(ApiError::Validation)?;

    if !state.contact_limiter().allow(&client) {
        warn!(client = %client, "contact creation rate limit exceeded");
        return Err(AuthError::RateLimited.into());
    }

    let record = ContactService::create(state.db(), user.id, req.into()).await?;
    Ok(Json(contact::to_response(record)))
}

/// List contacts
///
/// GET /contacts/?skip=&limit=
async fn list_contacts(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(page): Query<PaginationQuery>,
) -> ApiResult<Json<ContactListResponse>> {
    let (skip, limit) = page.normalize();
    let records = ContactService::list(state.db(), user.id, skip, limit).await?;
    Ok(list_response(records))
}

/// GET /contacts/{contact_id}
async fn get_contact(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(contact_id): Path<Uuid>,
) -> ApiResult<Json<ContactResponse>> {
    let record = ContactService::get(state.db(), user.id, contact_id).await?;
    Ok(Json(contact::to_response(record)))
}

/// Replace a contact
///
/// PUT /contacts/{contact_id}
async fn update_contact(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(contact_id): Path<Uuid>,
    Json(req): Json<ContactRequest>,
) -> ApiResult<Json<ContactResponse>> {
    validate_contact(&req).map_err(ApiError::Validation)?;

    let record = ContactService::update(state.db(), user.id, contact_id, req.into()).await?;
    Ok(Json(contact::to_response(record)))
}

/// DELETE /contacts/{contact_id}
async fn delete_contact(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(contact_id): Path<Uuid>,
) -> ApiResult<Json<ContactResponse>> {
    let record = ContactService::delete(state.db(), user.id, contact_id).await?;
    Ok(Json(contact::to_response(record)))
}

/// Search by first name, last name or email
///
/// GET /contacts/search/?query=&skip=&limit=
async fn search_contacts(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(search): Query<SearchQuery>,
) -> ApiResult<Json<ContactListResponse>> {
    validate_search_query(&search.query).map_err(ApiError::BadRequest)?;

    let (skip, limit) = search.page().normalize();
    let records = ContactService::search(state.db(), user.id, &search.query, skip, limit).await?;
    Ok(list_response(records))
}

/// GET /contacts/upcoming_birthdays/?days=
async fn upcoming_birthdays(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<BirthdayQuery>,
) -> ApiResult<Json<ContactListResponse>> {
    let today = Utc::now().date_naive();
    let records =
        ContactService::upcoming_birthdays(state.db(), user.id, today, query.window_days()).await?;
    Ok(list_response(records))
}
