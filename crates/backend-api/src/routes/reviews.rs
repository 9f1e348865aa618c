use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    routes::models::{ReviewListQuery, ReviewResponse, ReviewSummaryEntry},
    services::reviews as review_service,
    util::require_bearer,
    ApiError, AppState,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewsResponse {
    pub reviews: Vec<ReviewResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewSummaryResponse {
    pub campaigns: Vec<ReviewSummaryEntry>,
}

#[utoipa::path(
    get,
    path = "/api/reviews",
    tag = "Reviews",
    security(("bearerAuth" = [])),
    params(ReviewListQuery),
    responses(
        (status = 200, description = "Reviews left on the user's campaigns, newest first", body = ReviewsResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ReviewListQuery>,
) -> Result<Json<ReviewsResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let reviews =
        review_service::list_reviews(state.db_pool(), user.id, query.campaign_id.as_deref())
            .await?;

    Ok(Json(ReviewsResponse {
        reviews: reviews.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/reviews/summary",
    tag = "Reviews",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Review count and average rating per campaign", body = ReviewSummaryResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn review_summary(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ReviewSummaryResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let summary = review_service::review_summary(state.db_pool(), user.id).await?;

    Ok(Json(ReviewSummaryResponse {
        campaigns: summary.into_iter().map(Into::into).collect(),
    }))
}
