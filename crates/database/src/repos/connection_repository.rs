//! Google connection repository.
//!
//! At most one `active` row exists per (user, provider, email). The upsert
//! path enforces this by updating the existing active row when there is one;
//! the schema itself carries no unique constraint.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::entities::{Connection, ConnectionStatus, IntegrationProvider, TokenSet, UpsertOutcome};
use crate::types::{parse_timestamp, DatabaseError, DatabaseResult};
use crate::{new_public_id, now_rfc3339};

const CONNECTION_COLUMNS: &str = "id, public_id, user_id, provider, email, access_token, refresh_token, expires_at, scope, status, created_at, updated_at";

#[derive(Clone)]
pub struct ConnectionRepository {
    pool: SqlitePool,
}

impl ConnectionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list_for_user(&self, user_id: i64) -> DatabaseResult<Vec<Connection>> {
        let rows = sqlx::query(&format!(
            "SELECT {CONNECTION_COLUMNS} FROM connections WHERE user_id = ? ORDER BY updated_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_connection).collect()
    }

    /// Most recently updated active connection for the provider.
    pub async fn find_active(
        &self,
        user_id: i64,
        provider: IntegrationProvider,
    ) -> DatabaseResult<Option<Connection>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {CONNECTION_COLUMNS}
            FROM connections
            WHERE user_id = ? AND provider = ? AND status = 'active'
            ORDER BY updated_at DESC, id DESC
            LIMIT 1
            "#
        ))
        .bind(user_id)
        .bind(provider.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_connection).transpose()
    }

    /// Store freshly exchanged tokens: update the matching active row for
    /// (user, provider, email) if one exists, otherwise insert a new one.
    pub async fn upsert_active(
        &self,
        user_id: i64,
        provider: IntegrationProvider,
        email: &str,
        tokens: &TokenSet,
    ) -> DatabaseResult<(Connection, UpsertOutcome)> {
        let mut tx = self.pool.begin().await?;
        let now = now_rfc3339();
        let expires_at = tokens.expires_at.map(|value| value.to_rfc3339());

        let existing: Option<String> = sqlx::query_scalar(
            r#"
            SELECT public_id FROM connections
            WHERE user_id = ? AND provider = ? AND email = ? AND status = 'active'
            ORDER BY updated_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(provider.as_str())
        .bind(email)
        .fetch_optional(&mut *tx)
        .await?;

        let (public_id, outcome) = match existing {
            Some(public_id) => {
                sqlx::query(
                    r#"
                    UPDATE connections
                    SET access_token = ?,
                        refresh_token = COALESCE(?, refresh_token),
                        expires_at = ?,
                        scope = COALESCE(?, scope),
                        updated_at = ?
                    WHERE public_id = ?
                    "#,
                )
                .bind(&tokens.access_token)
                .bind(&tokens.refresh_token)
                .bind(&expires_at)
                .bind(&tokens.scope)
                .bind(&now)
                .bind(&public_id)
                .execute(&mut *tx)
                .await?;
                (public_id, UpsertOutcome::Updated)
            }
            None => {
                let public_id = new_public_id();
                sqlx::query(
                    r#"
                    INSERT INTO connections (public_id, user_id, provider, email, access_token, refresh_token, expires_at, scope, status, created_at, updated_at)
                    VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'active', ?, ?)
                    "#,
                )
                .bind(&public_id)
                .bind(user_id)
                .bind(provider.as_str())
                .bind(email)
                .bind(&tokens.access_token)
                .bind(&tokens.refresh_token)
                .bind(&expires_at)
                .bind(&tokens.scope)
                .bind(&now)
                .bind(&now)
                .execute(&mut *tx)
                .await?;
                (public_id, UpsertOutcome::Inserted)
            }
        };

        tx.commit().await?;

        let connection = self.require(&public_id).await?;
        Ok((connection, outcome))
    }

    /// Apply refreshed tokens. The stored refresh token is kept unless a new
    /// one is supplied.
    pub async fn update_tokens(&self, id: i64, tokens: &TokenSet) -> DatabaseResult<Connection> {
        let public_id: Option<String> = sqlx::query_scalar(
            r#"
            UPDATE connections
            SET access_token = ?,
                refresh_token = COALESCE(?, refresh_token),
                expires_at = ?,
                scope = COALESCE(?, scope),
                updated_at = ?
            WHERE id = ?
            RETURNING public_id
            "#,
        )
        .bind(&tokens.access_token)
        .bind(&tokens.refresh_token)
        .bind(tokens.expires_at.map(|value| value.to_rfc3339()))
        .bind(&tokens.scope)
        .bind(now_rfc3339())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let public_id =
            public_id.ok_or_else(|| DatabaseError::NotFound(format!("connection {id}")))?;
        self.require(&public_id).await
    }

    /// Mark every active connection for the provider revoked; returns the
    /// number of rows touched.
    pub async fn revoke_active(
        &self,
        user_id: i64,
        provider: IntegrationProvider,
    ) -> DatabaseResult<u64> {
        let result = sqlx::query(
            "UPDATE connections SET status = 'revoked', updated_at = ? WHERE user_id = ? AND provider = ? AND status = 'active'",
        )
        .bind(now_rfc3339())
        .bind(user_id)
        .bind(provider.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn count_active(&self, user_id: i64) -> DatabaseResult<i64> {
        let count = sqlx::query_scalar(
            "SELECT COUNT(*) FROM connections WHERE user_id = ? AND status = 'active'",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn require(&self, public_id: &str) -> DatabaseResult<Connection> {
        let row = sqlx::query(&format!(
            "SELECT {CONNECTION_COLUMNS} FROM connections WHERE public_id = ?"
        ))
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref()
            .map(map_connection)
            .transpose()?
            .ok_or_else(|| DatabaseError::NotFound(format!("connection {public_id}")))
    }
}

fn map_connection(row: &SqliteRow) -> DatabaseResult<Connection> {
    let provider: String = row.try_get("provider")?;
    let status: String = row.try_get("status")?;
    let provider = IntegrationProvider::parse(&provider)
        .ok_or_else(|| DatabaseError::NotFound(format!("integration provider {provider}")))?;

    Ok(Connection {
        id: row.try_get("id")?,
        public_id: row.try_get("public_id")?,
        user_id: row.try_get("user_id")?,
        provider,
        email: row.try_get("email")?,
        access_token: row.try_get("access_token")?,
        refresh_token: row.try_get("refresh_token")?,
        expires_at: parse_timestamp(row.try_get("expires_at")?),
        scope: row.try_get("scope")?,
        status: ConnectionStatus::from(status.as_str()),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
