use smileboard_database::{
    Contact, ContactFilter, ContactRepository, CreateContactRequest, UpdateContactRequest,
};
use sqlx::SqlitePool;

use super::error::ServiceError;

pub async fn list_contacts(
    pool: &SqlitePool,
    user_id: i64,
    filter: ContactFilter,
) -> Result<Vec<Contact>, ServiceError> {
    let contacts = ContactRepository::new(pool.clone())
        .list(user_id, &filter)
        .await?;
    Ok(contacts)
}

pub async fn create_contact(
    pool: &SqlitePool,
    user_id: i64,
    request: CreateContactRequest,
) -> Result<Contact, ServiceError> {
    if request.name.trim().is_empty() {
        return Err(ServiceError::bad_request("contact name must not be empty"));
    }
    let request = CreateContactRequest {
        email: blank_to_none(request.email),
        phone: blank_to_none(request.phone),
        ..request
    };

    let contact = ContactRepository::new(pool.clone())
        .create(user_id, &request)
        .await?;
    Ok(contact)
}

pub async fn get_contact(
    pool: &SqlitePool,
    user_id: i64,
    contact_id: &str,
) -> Result<Contact, ServiceError> {
    ContactRepository::new(pool.clone())
        .find(user_id, contact_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("contact not found"))
}

pub async fn update_contact(
    pool: &SqlitePool,
    user_id: i64,
    contact_id: &str,
    request: UpdateContactRequest,
) -> Result<Contact, ServiceError> {
    if matches!(request.name.as_deref(), Some(name) if name.trim().is_empty()) {
        return Err(ServiceError::bad_request("contact name must not be empty"));
    }
    let request = UpdateContactRequest {
        email: request.email.map(blank_to_none),
        phone: request.phone.map(blank_to_none),
        notes: request.notes.map(blank_to_none),
        ..request
    };

    ContactRepository::new(pool.clone())
        .update(user_id, contact_id, &request)
        .await?
        .ok_or_else(|| ServiceError::not_found("contact not found"))
}

pub async fn delete_contact(
    pool: &SqlitePool,
    user_id: i64,
    contact_id: &str,
) -> Result<(), ServiceError> {
    let deleted = ContactRepository::new(pool.clone())
        .delete(user_id, contact_id)
        .await?;
    if deleted {
        Ok(())
    } else {
        Err(ServiceError::not_found("contact not found"))
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
