use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;
use smileboard_database as db;
use utoipa::ToSchema;

use crate::{
    routes::models::{
        BillingListQuery, BillingLogResponse, CreateBillingLogRequest, UpdateBillingStatusRequest,
    },
    services::billing as billing_service,
    util::require_bearer,
    ApiError, AppState,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct BillingLogsResponse {
    pub logs: Vec<BillingLogResponse>,
}

impl From<CreateBillingLogRequest> for db::CreateBillingLogRequest {
    fn from(value: CreateBillingLogRequest) -> Self {
        Self {
            kind: value.kind,
            origin: value.origin,
            amount_cents: value.amount_cents,
            currency: value.currency.unwrap_or_default(),
            status: value.status,
            description: value.description,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/billing",
    tag = "Billing",
    security(("bearerAuth" = [])),
    params(BillingListQuery),
    responses(
        (status = 200, description = "Billing log entries, newest first", body = BillingLogsResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_billing_logs(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<BillingListQuery>,
) -> Result<Json<BillingLogsResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let logs = billing_service::list_billing_logs(state.db_pool(), user.id, query.status).await?;

    Ok(Json(BillingLogsResponse {
        logs: logs.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/billing",
    tag = "Billing",
    security(("bearerAuth" = [])),
    request_body = CreateBillingLogRequest,
    responses(
        (status = 201, description = "Billing log recorded", body = BillingLogResponse),
        (status = 400, description = "Invalid billing payload", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_billing_log(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateBillingLogRequest>,
) -> Result<(StatusCode, Json<BillingLogResponse>), ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let log = billing_service::create_billing_log(state.db_pool(), user.id, req.into()).await?;

    Ok((StatusCode::CREATED, Json(log.into())))
}

#[utoipa::path(
    patch,
    path = "/api/billing/{log_id}",
    tag = "Billing",
    security(("bearerAuth" = [])),
    params(("log_id" = String, Path, description = "Billing log ID")),
    request_body = UpdateBillingStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = BillingLogResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 404, description = "Billing log not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_billing_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(log_id): Path<String>,
    Json(req): Json<UpdateBillingStatusRequest>,
) -> Result<Json<BillingLogResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let log =
        billing_service::update_billing_status(state.db_pool(), user.id, &log_id, req.status)
            .await?;

    Ok(Json(log.into()))
}
