//! User repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::entities::{IntegrationProvider, Plan, UpdateUserRequest, User};
use crate::types::{parse_timestamp, DatabaseError, DatabaseResult};
use crate::now_rfc3339;

const USER_COLUMNS: &str = "id, public_id, email, display_name, clinic_name, plan, plan_expires_at, onboarding_completed, google_calendar_connected, google_business_connected, created_at, updated_at";

/// Repository for user database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_user).transpose()
    }

    pub async fn find_by_public_id(&self, public_id: &str) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE public_id = ?"))
            .bind(public_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_user).transpose()
    }

    pub async fn update_profile(&self, id: i64, request: &UpdateUserRequest) -> DatabaseResult<User> {
        sqlx::query(
            r#"
            UPDATE users
            SET display_name = COALESCE(?, display_name),
                clinic_name = COALESCE(?, clinic_name),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&request.display_name)
        .bind(&request.clinic_name)
        .bind(now_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.require(id).await
    }

    pub async fn complete_onboarding(&self, id: i64) -> DatabaseResult<User> {
        sqlx::query("UPDATE users SET onboarding_completed = 1, updated_at = ? WHERE id = ?")
            .bind(now_rfc3339())
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.require(id).await
    }

    pub async fn set_plan(
        &self,
        id: i64,
        plan: Plan,
        expires_at: Option<DateTime<Utc>>,
    ) -> DatabaseResult<User> {
        sqlx::query("UPDATE users SET plan = ?, plan_expires_at = ?, updated_at = ? WHERE id = ?")
            .bind(plan.as_str())
            .bind(expires_at.map(|value| value.to_rfc3339()))
            .bind(now_rfc3339())
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.require(id).await
    }

    /// Flip the per-provider "connected" flag on the user row.
    pub async fn set_integration_flag(
        &self,
        id: i64,
        provider: IntegrationProvider,
        connected: bool,
    ) -> DatabaseResult<()> {
        // Column name comes from a closed enum, never from input.
        let query = format!(
            "UPDATE users SET {} = ?, updated_at = ? WHERE id = ?",
            provider.user_flag_column()
        );
        sqlx::query(&query)
            .bind(connected)
            .bind(now_rfc3339())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn require(&self, id: i64) -> DatabaseResult<User> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("user {id}")))
    }
}

fn map_user(row: &SqliteRow) -> DatabaseResult<User> {
    let plan: String = row.try_get("plan")?;
    Ok(User {
        id: row.try_get("id")?,
        public_id: row.try_get("public_id")?,
        email: row.try_get("email")?,
        display_name: row.try_get("display_name")?,
        clinic_name: row.try_get("clinic_name")?,
        plan: Plan::from(plan.as_str()),
        plan_expires_at: parse_timestamp(row.try_get("plan_expires_at")?),
        onboarding_completed: row.try_get("onboarding_completed")?,
        google_calendar_connected: row.try_get("google_calendar_connected")?,
        google_business_connected: row.try_get("google_business_connected")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
