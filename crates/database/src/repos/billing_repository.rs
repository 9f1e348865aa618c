//! Billing log repository for database operations.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::entities::{BillingLog, BillingStatus, CreateBillingLogRequest};
use crate::types::{DatabaseError, DatabaseResult};
use crate::{new_public_id, now_rfc3339};

const BILLING_COLUMNS: &str = "id, public_id, user_id, kind, origin, amount_cents, currency, status, description, created_at, updated_at";

#[derive(Clone)]
pub struct BillingRepository {
    pool: SqlitePool,
}

impl BillingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, user_id: i64, status: Option<BillingStatus>) -> DatabaseResult<Vec<BillingLog>> {
        let status = status.map(|status| status.as_str());
        let rows = sqlx::query(&format!(
            r#"
            SELECT {BILLING_COLUMNS}
            FROM billing_logs
            WHERE user_id = ? AND (? IS NULL OR status = ?)
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(user_id)
        .bind(status)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_billing_log).collect()
    }

    pub async fn create(&self, user_id: i64, request: &CreateBillingLogRequest) -> DatabaseResult<BillingLog> {
        let public_id = new_public_id();
        let now = now_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO billing_logs (public_id, user_id, kind, origin, amount_cents, currency, status, description, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&public_id)
        .bind(user_id)
        .bind(&request.kind)
        .bind(&request.origin)
        .bind(request.amount_cents)
        .bind(&request.currency)
        .bind(request.status.as_str())
        .bind(&request.description)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.find(user_id, &public_id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("billing log {public_id}")))
    }

    pub async fn find(&self, user_id: i64, public_id: &str) -> DatabaseResult<Option<BillingLog>> {
        let row = sqlx::query(&format!(
            "SELECT {BILLING_COLUMNS} FROM billing_logs WHERE public_id = ? AND user_id = ?"
        ))
        .bind(public_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_billing_log).transpose()
    }

    pub async fn update_status(
        &self,
        user_id: i64,
        public_id: &str,
        status: BillingStatus,
    ) -> DatabaseResult<Option<BillingLog>> {
        let result = sqlx::query(
            "UPDATE billing_logs SET status = ?, updated_at = ? WHERE public_id = ? AND user_id = ?",
        )
        .bind(status.as_str())
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
}

fn map_billing_log(row: &SqliteRow) -> DatabaseResult<BillingLog> {
    let status: String = row.try_get("status")?;
    Ok(BillingLog {
        id: row.try_get("id")?,
        public_id: row.try_get("public_id")?,
        user_id: row.try_get("user_id")?,
        kind: row.try_get("kind")?,
        origin: row.try_get("origin")?,
        amount_cents: row.try_get("amount_cents")?,
        currency: row.try_get("currency")?,
        status: BillingStatus::from(status.as_str()),
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
