use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;
use smileboard_database as db;
use utoipa::ToSchema;

use crate::{
    routes::models::{
        ContactListQuery, ContactResponse, CreateContactRequest, UpdateContactRequest,
    },
    services::contacts as contact_service,
    util::require_bearer,
    ApiError, AppState,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct ContactsResponse {
    pub contacts: Vec<ContactResponse>,
}

impl From<CreateContactRequest> for db::CreateContactRequest {
    fn from(value: CreateContactRequest) -> Self {
        Self {
            name: value.name,
            email: value.email,
            phone: value.phone,
            origin: value.origin,
            tags: value.tags,
            notes: value.notes,
        }
    }
}

impl From<UpdateContactRequest> for db::UpdateContactRequest {
    fn from(value: UpdateContactRequest) -> Self {
        Self {
            name: value.name,
            email: value.email,
            phone: value.phone,
            tags: value.tags,
            notes: value.notes,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/contacts",
    tag = "Contacts",
    security(("bearerAuth" = [])),
    params(ContactListQuery),
    responses(
        (status = 200, description = "Contacts owned by the current user", body = ContactsResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_contacts(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ContactListQuery>,
) -> Result<Json<ContactsResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let filter = db::ContactFilter {
        tag: query.tag,
        search: query.search,
    };
    let contacts = contact_service::list_contacts(state.db_pool(), user.id, filter).await?;

    Ok(Json(ContactsResponse {
        contacts: contacts.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/contacts",
    tag = "Contacts",
    security(("bearerAuth" = [])),
    request_body = CreateContactRequest,
    responses(
        (status = 201, description = "Contact created", body = ContactResponse),
        (status = 400, description = "Invalid contact payload", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_contact(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateContactRequest>,
) -> Result<(StatusCode, Json<ContactResponse>), ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let contact = contact_service::create_contact(state.db_pool(), user.id, req.into()).await?;

    Ok((StatusCode::CREATED, Json(contact.into())))
}

#[utoipa::path(
    get,
    path = "/api/contacts/{contact_id}",
    tag = "Contacts",
    security(("bearerAuth" = [])),
    params(("contact_id" = String, Path, description = "Contact ID")),
    responses(
        (status = 200, description = "Contact details", body = ContactResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 404, description = "Contact not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_contact(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(contact_id): Path<String>,
) -> Result<Json<ContactResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let contact = contact_service::get_contact(state.db_pool(), user.id, &contact_id).await?;

    Ok(Json(contact.into()))
}

#[utoipa::path(
    patch,
    path = "/api/contacts/{contact_id}",
    tag = "Contacts",
    security(("bearerAuth" = [])),
    params(("contact_id" = String, Path, description = "Contact ID")),
    request_body = UpdateContactRequest,
    responses(
        (status = 200, description = "Contact updated", body = ContactResponse),
        (status = 400, description = "Invalid contact payload", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 404, description = "Contact not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_contact(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(contact_id): Path<String>,
    Json(req): Json<UpdateContactRequest>,
) -> Result<Json<ContactResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let contact =
        contact_service::update_contact(state.db_pool(), user.id, &contact_id, req.into()).await?;

    Ok(Json(contact.into()))
}

#[utoipa::path(
    delete,
    path = "/api/contacts/{contact_id}",
    tag = "Contacts",
    security(("bearerAuth" = [])),
    params(("contact_id" = String, Path, description = "Contact ID")),
    responses(
        (status = 204, description = "Contact deleted"),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 404, description = "Contact not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_contact(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(contact_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    contact_service::delete_contact(state.db_pool(), user.id, &contact_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
