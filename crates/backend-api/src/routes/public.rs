//! Unauthenticated endpoints backing the patient-facing review page.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    routes::models::ReviewResponse,
    services::reviews::{self as review_service, ReviewSubmission},
    util::client_ip,
    ApiError, AppState,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct PublicCampaignResponse {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clinic_name: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitReviewRequest {
    pub rating: i64,
    pub comment: Option<String>,
    #[serde(alias = "reviewer_name")]
    pub name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitReviewResponse {
    pub review: ReviewResponse,
    /// External review link the patient should be sent to, if any.
    pub redirect_url: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/public/campaigns/{campaign_id}",
    tag = "Public",
    params(("campaign_id" = String, Path, description = "Campaign ID")),
    responses(
        (status = 200, description = "Campaign shown on the review page", body = PublicCampaignResponse),
        (status = 404, description = "Campaign not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_public_campaign(
    State(state): State<AppState>,
    Path(campaign_id): Path<String>,
) -> Result<Json<PublicCampaignResponse>, ApiError> {
    let public = review_service::public_campaign(state.db_pool(), &campaign_id).await?;

    Ok(Json(PublicCampaignResponse {
        id: public.campaign.public_id,
        name: public.campaign.name,
        clinic_name: public.clinic_name,
        is_active: public.campaign.is_active,
    }))
}

#[utoipa::path(
    post,
    path = "/api/public/campaigns/{campaign_id}/reviews",
    tag = "Public",
    params(("campaign_id" = String, Path, description = "Campaign ID")),
    request_body = SubmitReviewRequest,
    responses(
        (status = 201, description = "Review stored", body = SubmitReviewResponse),
        (status = 400, description = "Rating out of range", body = crate::error::ErrorResponse),
        (status = 404, description = "Campaign not found or inactive", body = crate::error::ErrorResponse)
    )
)]
pub async fn submit_review(
    State(state): State<AppState>,
    Path(campaign_id): Path<String>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(req): Json<SubmitReviewRequest>,
) -> Result<(StatusCode, Json<SubmitReviewResponse>), ApiError> {
    let submission = ReviewSubmission {
        rating: req.rating,
        comment: req.comment,
        reviewer_name: req.name,
        submitter_ip: client_ip(&headers, peer.map(|ConnectInfo(addr)| addr)),
    };

    let submitted = review_service::submit_review(state.db_pool(), &campaign_id, submission).await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitReviewResponse {
            review: submitted.review.into(),
            redirect_url: submitted.redirect_url,
        }),
    ))
}
