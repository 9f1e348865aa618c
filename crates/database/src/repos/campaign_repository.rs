//! Campaign repository for database operations.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::entities::{Campaign, CampaignChannel, CreateCampaignRequest, UpdateCampaignRequest};
use crate::types::{DatabaseError, DatabaseResult};
use crate::{new_public_id, now_rfc3339};

const CAMPAIGN_COLUMNS: &str = "id, public_id, user_id, name, channel, message_template, min_redirect_rating, redirect_url, is_active, created_at, updated_at";

#[derive(Clone)]
pub struct CampaignRepository {
    pool: SqlitePool,
}

impl CampaignRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, user_id: i64) -> DatabaseResult<Vec<Campaign>> {
        let rows = sqlx::query(&format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE user_id = ? ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_campaign).collect()
    }

    pub async fn create(&self, user_id: i64, request: &CreateCampaignRequest) -> DatabaseResult<Campaign> {
        let public_id = new_public_id();
        let now = now_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO campaigns (public_id, user_id, name, channel, message_template, min_redirect_rating, redirect_url, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&public_id)
        .bind(user_id)
        .bind(request.name.trim())
        .bind(request.channel.as_str())
        .bind(&request.message_template)
        .bind(request.min_redirect_rating)
        .bind(request.redirect_url.is_some())
        .bind(request.redirect_url.clone())
        .bind(request.is_active)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.find(user_id, &public_id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("campaign {public_id}")))
    }

    pub async fn find(&self, user_id: i64, public_id: &str) -> DatabaseResult<Option<Campaign>> {
        let row = sqlx::query(&format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE public_id = ? AND user_id = ?"
        ))
        .bind(public_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_campaign).transpose()
    }

    /// Unscoped lookup used by the public review page.
    pub async fn find_by_public_id(&self, public_id: &str) -> DatabaseResult<Option<Campaign>> {
        let row = sqlx::query(&format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE public_id = ?"
        ))
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_campaign).transpose()
    }

    pub async fn update(
        &self,
        user_id: i64,
        public_id: &str,
        request: &UpdateCampaignRequest,
    ) -> DatabaseResult<Option<Campaign>> {
        let result = sqlx::query(
            r#"
            UPDATE campaigns
            SET name = COALESCE(?, name),
                channel = COALESCE(?, channel),
                message_template = COALESCE(?, message_template),
                min_redirect_rating = COALESCE(?, min_redirect_rating),
                redirect_url = CASE WHEN ? THEN ? ELSE redirect_url END,
                is_active = COALESCE(?, is_active),
                updated_at = ?
            WHERE public_id = ? AND user_id = ?
            "#,
        )
        .bind(request.name.as_deref().map(str::trim))
        .bind(request.channel.map(|channel| channel.as_str()))
        .bind(&request.message_template)
        .bind(request.min_redirect_rating)
        .bind(request.redirect_url.is_some())
        .bind(request.redirect_url.clone().flatten())
        .bind(request.is_active)
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
        let result = sqlx::query("DELETE FROM campaigns WHERE public_id = ? AND user_id = ?")
            .bind(public_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn map_campaign(row: &SqliteRow) -> DatabaseResult<Campaign> {
    let channel: String = row.try_get("channel")?;
    Ok(Campaign {
        id: row.try_get("id")?,
        public_id: row.try_get("public_id")?,
        user_id: row.try_get("user_id")?,
        name: row.try_get("name")?,
        channel: CampaignChannel::from(channel.as_str()),
        message_template: row.try_get("message_template")?,
        min_redirect_rating: row.try_get("min_redirect_rating")?,
        redirect_url: row.try_get("redirect_url")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
