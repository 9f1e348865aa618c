use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;
use smileboard_database::{self as db, Feature, User};
use utoipa::ToSchema;

use crate::{
    routes::models::{
        CampaignPreviewResponse, CampaignResponse, CreateCampaignRequest, PreviewQuery,
        UpdateCampaignRequest,
    },
    services::{campaigns as campaign_service, plan::require_feature},
    util::require_bearer,
    ApiError, AppState,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct CampaignsResponse {
    pub campaigns: Vec<CampaignResponse>,
}

impl From<CreateCampaignRequest> for db::CreateCampaignRequest {
    fn from(value: CreateCampaignRequest) -> Self {
        Self {
            name: value.name,
            channel: value.channel,
            message_template: value.message_template,
            min_redirect_rating: value
                .min_redirect_rating
                .unwrap_or(campaign_service::DEFAULT_MIN_REDIRECT_RATING),
            redirect_url: value.redirect_url,
            is_active: value.is_active.unwrap_or(true),
        }
    }
}

impl From<UpdateCampaignRequest> for db::UpdateCampaignRequest {
    fn from(value: UpdateCampaignRequest) -> Self {
        Self {
            name: value.name,
            channel: value.channel,
            message_template: value.message_template,
            min_redirect_rating: value.min_redirect_rating,
            redirect_url: value.redirect_url,
            is_active: value.is_active,
        }
    }
}

/// Authenticate and check the plan covers campaigns.
async fn campaign_user(state: &AppState, headers: &HeaderMap) -> Result<User, ApiError> {
    let token = require_bearer(headers)?;
    let (user, _) = state.authenticate(&token).await?;
    require_feature(&user, Feature::Campaigns)?;
    Ok(user)
}

#[utoipa::path(
    get,
    path = "/api/campaigns",
    tag = "Campaigns",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Campaigns owned by the current user", body = CampaignsResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 403, description = "Plan does not include campaigns", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_campaigns(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CampaignsResponse>, ApiError> {
    let user = campaign_user(&state, &headers).await?;

    let campaigns = campaign_service::list_campaigns(state.db_pool(), user.id).await?;

    Ok(Json(CampaignsResponse {
        campaigns: campaigns.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/campaigns",
    tag = "Campaigns",
    security(("bearerAuth" = [])),
    request_body = CreateCampaignRequest,
    responses(
        (status = 201, description = "Campaign created", body = CampaignResponse),
        (status = 400, description = "Invalid campaign payload", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 403, description = "Plan does not include campaigns", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_campaign(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateCampaignRequest>,
) -> Result<(StatusCode, Json<CampaignResponse>), ApiError> {
    let user = campaign_user(&state, &headers).await?;

    let campaign = campaign_service::create_campaign(state.db_pool(), user.id, req.into()).await?;

    Ok((StatusCode::CREATED, Json(campaign.into())))
}

#[utoipa::path(
    get,
    path = "/api/campaigns/{campaign_id}",
    tag = "Campaigns",
    security(("bearerAuth" = [])),
    params(("campaign_id" = String, Path, description = "Campaign ID")),
    responses(
        (status = 200, description = "Campaign details", body = CampaignResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 403, description = "Plan does not include campaigns", body = crate::error::ErrorResponse),
        (status = 404, description = "Campaign not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_campaign(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(campaign_id): Path<String>,
) -> Result<Json<CampaignResponse>, ApiError> {
    let user = campaign_user(&state, &headers).await?;

    let campaign = campaign_service::get_campaign(state.db_pool(), user.id, &campaign_id).await?;

    Ok(Json(campaign.into()))
}

#[utoipa::path(
    patch,
    path = "/api/campaigns/{campaign_id}",
    tag = "Campaigns",
    security(("bearerAuth" = [])),
    params(("campaign_id" = String, Path, description = "Campaign ID")),
    request_body = UpdateCampaignRequest,
    responses(
        (status = 200, description = "Campaign updated", body = CampaignResponse),
        (status = 400, description = "Invalid campaign payload", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 403, description = "Plan does not include campaigns", body = crate::error::ErrorResponse),
        (status = 404, description = "Campaign not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_campaign(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(campaign_id): Path<String>,
    Json(req): Json<UpdateCampaignRequest>,
) -> Result<Json<CampaignResponse>, ApiError> {
    let user = campaign_user(&state, &headers).await?;

    let campaign =
        campaign_service::update_campaign(state.db_pool(), user.id, &campaign_id, req.into())
            .await?;

    Ok(Json(campaign.into()))
}

#[utoipa::path(
    delete,
    path = "/api/campaigns/{campaign_id}",
    tag = "Campaigns",
    security(("bearerAuth" = [])),
    params(("campaign_id" = String, Path, description = "Campaign ID")),
    responses(
        (status = 204, description = "Campaign deleted"),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 403, description = "Plan does not include campaigns", body = crate::error::ErrorResponse),
        (status = 404, description = "Campaign not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_campaign(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(campaign_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let user = campaign_user(&state, &headers).await?;

    campaign_service::delete_campaign(state.db_pool(), user.id, &campaign_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/campaigns/{campaign_id}/preview",
    tag = "Campaigns",
    security(("bearerAuth" = [])),
    params(
        ("campaign_id" = String, Path, description = "Campaign ID"),
        PreviewQuery
    ),
    responses(
        (status = 200, description = "Message as the recipient would receive it", body = CampaignPreviewResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 403, description = "Plan does not include campaigns", body = crate::error::ErrorResponse),
        (status = 404, description = "Campaign or contact not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn preview_campaign(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(campaign_id): Path<String>,
    Query(query): Query<PreviewQuery>,
) -> Result<Json<CampaignPreviewResponse>, ApiError> {
    let user = campaign_user(&state, &headers).await?;

    let rendered = campaign_service::preview_campaign(
        state.db_pool(),
        &user,
        &campaign_id,
        query.contact_id.as_deref(),
        &state.integrations().public_base_url,
    )
    .await?;

    Ok(Json(CampaignPreviewResponse {
        message: rendered.message,
        review_link: rendered.review_link,
    }))
}
