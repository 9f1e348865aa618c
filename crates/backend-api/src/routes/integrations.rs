use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Html,
    Json,
};
use serde::{Deserialize, Serialize};
use smileboard_database::IntegrationProvider;
use tracing::warn;
use utoipa::{IntoParams, ToSchema};

use crate::{
    routes::models::ConnectionResponse,
    services::integration as integration_service,
    util::require_bearer,
    ApiError, AppState,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct ConnectionsResponse {
    pub connections: Vec<ConnectionResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthUrlResponse {
    pub authorize_url: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DisconnectResponse {
    pub provider: String,
    pub connections_revoked: u64,
    /// False when Google rejected or could not be reached for the revoke call.
    pub provider_revoked: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set by Google when the user declined consent.
    pub error: Option<String>,
}

fn parse_provider(value: &str) -> Result<IntegrationProvider, ApiError> {
    IntegrationProvider::parse(value)
        .ok_or_else(|| ApiError::bad_request(format!("unknown integration provider '{value}'")))
}

#[utoipa::path(
    get,
    path = "/api/integrations",
    tag = "Integrations",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Google connections for the current user", body = ConnectionsResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_connections(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ConnectionsResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let connections = integration_service::list_connections(state.db_pool(), user.id).await?;

    Ok(Json(ConnectionsResponse {
        connections: connections.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/integrations/{provider}/auth-url",
    tag = "Integrations",
    security(("bearerAuth" = [])),
    params(("provider" = String, Path, description = "google_calendar or google_business")),
    responses(
        (status = 200, description = "Google consent URL", body = AuthUrlResponse),
        (status = 400, description = "Unknown provider", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 403, description = "Plan does not include this integration", body = crate::error::ErrorResponse),
        (status = 503, description = "Google OAuth not configured", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_auth_url(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(provider): Path<String>,
) -> Result<Json<AuthUrlResponse>, ApiError> {
    let provider = parse_provider(&provider)?;
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let authorize_url = integration_service::authorization_url(&state, &user, provider).await?;

    Ok(Json(AuthUrlResponse { authorize_url }))
}

#[utoipa::path(
    get,
    path = "/api/integrations/google/callback",
    tag = "Integrations",
    params(CallbackQuery),
    responses(
        (status = 200, description = "Popup page reporting the outcome to the opener", content_type = "text/html", body = String),
        (status = 400, description = "Missing code or invalid state", body = crate::error::ErrorResponse),
        (status = 502, description = "Google rejected the exchange", body = crate::error::ErrorResponse),
        (status = 503, description = "Google OAuth not configured", body = crate::error::ErrorResponse)
    )
)]
pub async fn oauth_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Result<Html<String>, ApiError> {
    let origins = &state.integrations().allowed_origins;

    if let Some(error) = query.error.as_deref() {
        let provider = integration_service::abandon_callback(&state, query.state.as_deref()).await;
        warn!(%error, provider = ?provider, "google consent was not granted");
        let message = integration_service::error_message(provider, error);
        return Ok(Html(integration_service::render_popup_page(
            origins, &message,
        )));
    }

    let code = query
        .code
        .as_deref()
        .filter(|code| !code.is_empty())
        .ok_or_else(|| ApiError::bad_request("missing authorization code"))?;
    let oauth_state = query
        .state
        .as_deref()
        .ok_or_else(|| ApiError::bad_request("missing OAuth state"))?;

    let result = integration_service::complete_callback(&state, code, oauth_state).await?;
    let message = integration_service::success_message(&result);

    Ok(Html(integration_service::render_popup_page(
        origins, &message,
    )))
}

#[utoipa::path(
    post,
    path = "/api/integrations/{provider}/refresh",
    tag = "Integrations",
    security(("bearerAuth" = [])),
    params(("provider" = String, Path, description = "google_calendar or google_business")),
    responses(
        (status = 200, description = "Access token refreshed", body = ConnectionResponse),
        (status = 400, description = "Connection has no refresh token", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 404, description = "No active connection", body = crate::error::ErrorResponse),
        (status = 502, description = "Google rejected the refresh", body = crate::error::ErrorResponse)
    )
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(provider): Path<String>,
) -> Result<Json<ConnectionResponse>, ApiError> {
    let provider = parse_provider(&provider)?;
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let connection = integration_service::refresh_connection(&state, &user, provider).await?;

    Ok(Json(connection.into()))
}

#[utoipa::path(
    post,
    path = "/api/integrations/{provider}/disconnect",
    tag = "Integrations",
    security(("bearerAuth" = [])),
    params(("provider" = String, Path, description = "google_calendar or google_business")),
    responses(
        (status = 200, description = "Connection revoked", body = DisconnectResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 404, description = "No active connection", body = crate::error::ErrorResponse)
    )
)]
pub async fn disconnect(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(provider): Path<String>,
) -> Result<Json<DisconnectResponse>, ApiError> {
    let provider = parse_provider(&provider)?;
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let result = integration_service::disconnect(&state, &user, provider).await?;

    Ok(Json(DisconnectResponse {
        provider: provider.to_string(),
        connections_revoked: result.connections_revoked,
        provider_revoked: result.provider_revoked,
    }))
}
