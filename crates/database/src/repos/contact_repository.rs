//! Contact repository for database operations.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::entities::contact::normalize_tags;
use crate::entities::{Contact, ContactFilter, ContactOrigin, CreateContactRequest, UpdateContactRequest};
use crate::types::DatabaseResult;
use crate::{new_public_id, now_rfc3339};

const CONTACT_COLUMNS: &str =
    "id, public_id, user_id, name, email, phone, origin, tags, notes, created_at, updated_at";

#[derive(Clone)]
pub struct ContactRepository {
    pool: SqlitePool,
}

impl ContactRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List a clinic's contacts, newest first. `search` matches name, email or
    /// phone; `tag` is matched case-insensitively.
    pub async fn list(&self, user_id: i64, filter: &ContactFilter) -> DatabaseResult<Vec<Contact>> {
        let pattern = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(|term| format!("%{term}%"));

        let rows = sqlx::query(&format!(
            r#"
            SELECT {CONTACT_COLUMNS}
            FROM contacts
            WHERE user_id = ?
              AND (? IS NULL OR name LIKE ? OR email LIKE ? OR phone LIKE ?)
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(user_id)
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        let contacts = rows
            .iter()
            .map(map_contact)
            .collect::<DatabaseResult<Vec<_>>>()?;

        Ok(match filter.tag.as_deref().map(str::trim) {
            Some(tag) if !tag.is_empty() => contacts
                .into_iter()
                .filter(|contact| contact.has_tag(tag))
                .collect(),
            _ => contacts,
        })
    }

    pub async fn create(&self, user_id: i64, request: &CreateContactRequest) -> DatabaseResult<Contact> {
        let public_id = new_public_id();
        let now = now_rfc3339();
        let tags = serde_json::to_string(&normalize_tags(&request.tags))?;

        sqlx::query(
            r#"
            INSERT INTO contacts (public_id, user_id, name, email, phone, origin, tags, notes, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&public_id)
        .bind(user_id)
        .bind(request.name.trim())
        .bind(&request.email)
        .bind(&request.phone)
        .bind(request.origin.as_str())
        .bind(tags)
        .bind(&request.notes)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.require(user_id, &public_id).await
    }

    pub async fn find(&self, user_id: i64, public_id: &str) -> DatabaseResult<Option<Contact>> {
        let row = sqlx::query(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts WHERE public_id = ? AND user_id = ?"
        ))
        .bind(public_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_contact).transpose()
    }

    pub async fn update(
        &self,
        user_id: i64,
        public_id: &str,
        request: &UpdateContactRequest,
    ) -> DatabaseResult<Option<Contact>> {
        let tags = request
            .tags
            .as_ref()
            .map(|tags| serde_json::to_string(&normalize_tags(tags)))
            .transpose()?;

        let result = sqlx::query(
            r#"
            UPDATE contacts
            SET name = COALESCE(?, name),
                email = CASE WHEN ? THEN ? ELSE email END,
                phone = CASE WHEN ? THEN ? ELSE phone END,
                tags = COALESCE(?, tags),
                notes = CASE WHEN ? THEN ? ELSE notes END,
                updated_at = ?
            WHERE public_id = ? AND user_id = ?
            "#,
        )
        .bind(request.name.as_deref().map(str::trim))
        .bind(request.email.is_some())
        .bind(request.email.clone().flatten())
        .bind(request.phone.is_some())
        .bind(request.phone.clone().flatten())
        .bind(tags)
        .bind(request.notes.is_some())
        .bind(request.notes.clone().flatten())
        .bind(now_rfc3339())
        .bind(public_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.find(user_id, public_id).await
    }

    pub async fn delete(&self, user_id: i64, public_id: &str) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM contacts WHERE public_id = ? AND user_id = ?")
            .bind(public_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn require(&self, user_id: i64, public_id: &str) -> DatabaseResult<Contact> {
        self.find(user_id, public_id).await?.ok_or_else(|| {
            crate::DatabaseError::NotFound(format!("contact {public_id}"))
        })
    }
}

fn map_contact(row: &SqliteRow) -> DatabaseResult<Contact> {
    let origin: String = row.try_get("origin")?;
    let tags: String = row.try_get("tags")?;
    Ok(Contact {
        id: row.try_get("id")?,
        public_id: row.try_get("public_id")?,
        user_id: row.try_get("user_id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        origin: ContactOrigin::from(origin.as_str()),
        tags: serde_json::from_str(&tags)?,
        notes: row.try_get("notes")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
