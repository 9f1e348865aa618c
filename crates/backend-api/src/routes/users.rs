use axum::{extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};
use smileboard_database::UpdateUserRequest;
use utoipa::ToSchema;

use crate::{
    routes::models::UserResponse, services::users as user_service, util::require_bearer,
    ApiError, AppState,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct UserProfileResponse {
    pub user: UserResponse,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserProfileRequest {
    pub display_name: Option<String>,
    pub clinic_name: Option<String>,
}

impl From<UpdateUserProfileRequest> for UpdateUserRequest {
    fn from(value: UpdateUserProfileRequest) -> Self {
        Self {
            display_name: value.display_name,
            clinic_name: value.clinic_name,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Current user profile", body = UserProfileResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_current_user(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserProfileResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    Ok(Json(UserProfileResponse { user: user.into() }))
}

#[utoipa::path(
    patch,
    path = "/api/users/me",
    tag = "Users",
    security(("bearerAuth" = [])),
    request_body = UpdateUserProfileRequest,
    responses(
        (status = 200, description = "Updated user profile", body = UserProfileResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_current_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<UpdateUserProfileRequest>,
) -> Result<Json<UserProfileResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let updated = user_service::update_profile(state.db_pool(), user.id, payload.into()).await?;

    Ok(Json(UserProfileResponse {
        user: updated.into(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/users/me/onboarding",
    tag = "Users",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Onboarding marked complete", body = UserProfileResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn complete_onboarding(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserProfileResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let updated = user_service::complete_onboarding(state.db_pool(), user.id).await?;

    Ok(Json(UserProfileResponse {
        user: updated.into(),
    }))
}
