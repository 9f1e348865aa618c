//! Review repository for database operations.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::entities::{CampaignReviewSummary, CreateReviewRequest, Review};
use crate::types::{DatabaseError, DatabaseResult};
use crate::{new_public_id, now_rfc3339};

#[derive(Clone)]
pub struct ReviewRepository {
    pool: SqlitePool,
}

impl ReviewRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, campaign_id: i64, request: &CreateReviewRequest) -> DatabaseResult<Review> {
        let public_id = new_public_id();

        sqlx::query(
            r#"
            INSERT INTO reviews (public_id, campaign_id, rating, comment, reviewer_name, submitter_ip, redirected, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&public_id)
        .bind(campaign_id)
        .bind(request.rating)
        .bind(&request.comment)
        .bind(&request.reviewer_name)
        .bind(&request.submitter_ip)
        .bind(request.redirected)
        .bind(now_rfc3339())
        .execute(&self.pool)
        .await?;

        let row = sqlx::query(
            r#"
            SELECT r.id, r.public_id, r.campaign_id, c.public_id AS campaign_public_id, r.rating,
                   r.comment, r.reviewer_name, r.submitter_ip, r.redirected, r.created_at
            FROM reviews r
            JOIN campaigns c ON c.id = r.campaign_id
            WHERE r.public_id = ?
            "#,
        )
        .bind(&public_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref()
            .map(map_review)
            .transpose()?
            .ok_or_else(|| DatabaseError::NotFound(format!("review {public_id}")))
    }

    /// Reviews left on the clinic's campaigns, newest first.
    pub async fn list_for_user(
        &self,
        user_id: i64,
        campaign_public_id: Option<&str>,
    ) -> DatabaseResult<Vec<Review>> {
        let rows = sqlx::query(
            r#"
            SELECT r.id, r.public_id, r.campaign_id, c.public_id AS campaign_public_id, r.rating,
                   r.comment, r.reviewer_name, r.submitter_ip, r.redirected, r.created_at
            FROM reviews r
            JOIN campaigns c ON c.id = r.campaign_id
            WHERE c.user_id = ?
              AND (? IS NULL OR c.public_id = ?)
            ORDER BY r.created_at DESC, r.id DESC
            "#,
        )
        .bind(user_id)
        .bind(campaign_public_id)
        .bind(campaign_public_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_review).collect()
    }

    pub async fn summary_for_user(&self, user_id: i64) -> DatabaseResult<Vec<CampaignReviewSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT c.public_id AS campaign_public_id, c.name AS campaign_name,
                   COUNT(r.id) AS review_count, AVG(r.rating) AS average_rating
            FROM campaigns c
            LEFT JOIN reviews r ON r.campaign_id = c.id
            WHERE c.user_id = ?
            GROUP BY c.id
            ORDER BY c.created_at DESC, c.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(CampaignReviewSummary {
                    campaign_public_id: row.try_get("campaign_public_id")?,
                    campaign_name: row.try_get("campaign_name")?,
                    review_count: row.try_get("review_count")?,
                    average_rating: row.try_get("average_rating")?,
                })
            })
            .collect()
    }
}

fn map_review(row: &SqliteRow) -> DatabaseResult<Review> {
    Ok(Review {
        id: row.try_get("id")?,
        public_id: row.try_get("public_id")?,
        campaign_id: row.try_get("campaign_id")?,
        campaign_public_id: row.try_get("campaign_public_id")?,
        rating: row.try_get("rating")?,
        comment: row.try_get("comment")?,
        reviewer_name: row.try_get("reviewer_name")?,
        submitter_ip: row.try_get("submitter_ip")?,
        redirected: row.try_get("redirected")?,
        created_at: row.try_get("created_at")?,
    })
}
