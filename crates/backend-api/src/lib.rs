mod docs;
mod error;
mod state;
mod util;

pub mod routes;
pub mod services;

pub use docs::ApiDoc;
pub use error::{ApiError, ErrorResponse};
pub use state::{AppState, OAuthStateStore, PendingAuthorization};

use std::time::Instant;

use axum::{
    extract::Request,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware::{self, Next},
    response::Response,
    routing::{get, patch, post},
    Json, Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};
use utoipa::OpenApi;

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.integrations().allowed_origins);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/api-docs/openapi.json", get(openapi_document))
        // Auth routes
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/logout", post(routes::auth::logout))
        // User routes
        .route(
            "/api/users/me",
            get(routes::users::get_current_user).patch(routes::users::update_current_user),
        )
        .route(
            "/api/users/me/onboarding",
            post(routes::users::complete_onboarding),
        )
        // Contact routes
        .route(
            "/api/contacts",
            get(routes::contacts::list_contacts).post(routes::contacts::create_contact),
        )
        .route(
            "/api/contacts/:contact_id",
            get(routes::contacts::get_contact)
                .patch(routes::contacts::update_contact)
                .delete(routes::contacts::delete_contact),
        )
        // Campaign routes
        .route(
            "/api/campaigns",
            get(routes::campaigns::list_campaigns).post(routes::campaigns::create_campaign),
        )
        .route(
            "/api/campaigns/:campaign_id",
            get(routes::campaigns::get_campaign)
                .patch(routes::campaigns::update_campaign)
                .delete(routes::campaigns::delete_campaign),
        )
        .route(
            "/api/campaigns/:campaign_id/preview",
            get(routes::campaigns::preview_campaign),
        )
        // Review routes
        .route("/api/reviews", get(routes::reviews::list_reviews))
        .route("/api/reviews/summary", get(routes::reviews::review_summary))
        // Billing routes
        .route(
            "/api/billing",
            get(routes::billing::list_billing_logs).post(routes::billing::create_billing_log),
        )
        .route(
            "/api/billing/:log_id",
            patch(routes::billing::update_billing_status),
        )
        // Integration routes
        .route(
            "/api/integrations",
            get(routes::integrations::list_connections),
        )
        .route(
            "/api/integrations/google/callback",
            get(routes::integrations::oauth_callback),
        )
        .route(
            "/api/integrations/:provider/auth-url",
            post(routes::integrations::get_auth_url),
        )
        .route(
            "/api/integrations/:provider/refresh",
            post(routes::integrations::refresh_token),
        )
        .route(
            "/api/integrations/:provider/disconnect",
            post(routes::integrations::disconnect),
        )
        // Public review page
        .route(
            "/api/public/campaigns/:campaign_id",
            get(routes::public::get_public_campaign),
        )
        .route(
            "/api/public/campaigns/:campaign_id/reviews",
            post(routes::public::submit_review),
        )
        .with_state(state)
        .layer(middleware::from_fn(log_requests))
        .layer(cors)
}

async fn openapi_document() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    // Query strings can carry OAuth codes and states.
    let path = request.uri().path().to_owned();

    let start = Instant::now();
    let response = next.run(request).await;

    info!(
        method = %method,
        path = %path,
        status = %response.status(),
        duration_ms = start.elapsed().as_millis(),
        "request completed"
    );

    response
}

/// Browsers may only call the API from the configured dashboard origins; an
/// empty list opens it to any origin.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}
