use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health_check,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::users::get_current_user,
        crate::routes::users::update_current_user,
        crate::routes::users::complete_onboarding,
        crate::routes::contacts::list_contacts,
        crate::routes::contacts::create_contact,
        crate::routes::contacts::get_contact,
        crate::routes::contacts::update_contact,
        crate::routes::contacts::delete_contact,
        crate::routes::campaigns::list_campaigns,
        crate::routes::campaigns::create_campaign,
        crate::routes::campaigns::get_campaign,
        crate::routes::campaigns::update_campaign,
        crate::routes::campaigns::delete_campaign,
        crate::routes::campaigns::preview_campaign,
        crate::routes::reviews::list_reviews,
        crate::routes::reviews::review_summary,
        crate::routes::billing::list_billing_logs,
        crate::routes::billing::create_billing_log,
        crate::routes::billing::update_billing_status,
        crate::routes::integrations::list_connections,
        crate::routes::integrations::get_auth_url,
        crate::routes::integrations::oauth_callback,
        crate::routes::integrations::refresh_token,
        crate::routes::integrations::disconnect,
        crate::routes::public::get_public_campaign,
        crate::routes::public::submit_review
    ),
    components(
        schemas(
            crate::error::ErrorResponse,
            crate::routes::health::HealthResponse,
            crate::routes::auth::RegisterRequest,
            crate::routes::auth::LoginRequest,
            crate::routes::auth::SessionResponse,
            crate::routes::users::UserProfileResponse,
            crate::routes::users::UpdateUserProfileRequest,
            crate::routes::models::UserResponse,
            crate::routes::models::ContactResponse,
            crate::routes::models::CreateContactRequest,
            crate::routes::models::UpdateContactRequest,
            crate::routes::contacts::ContactsResponse,
            crate::routes::models::CampaignResponse,
            crate::routes::models::CreateCampaignRequest,
            crate::routes::models::UpdateCampaignRequest,
            crate::routes::models::CampaignPreviewResponse,
            crate::routes::campaigns::CampaignsResponse,
            crate::routes::models::ReviewResponse,
            crate::routes::models::ReviewSummaryEntry,
            crate::routes::reviews::ReviewsResponse,
            crate::routes::reviews::ReviewSummaryResponse,
            crate::routes::models::BillingLogResponse,
            crate::routes::models::CreateBillingLogRequest,
            crate::routes::models::UpdateBillingStatusRequest,
            crate::routes::billing::BillingLogsResponse,
            crate::routes::models::ConnectionResponse,
            crate::routes::integrations::ConnectionsResponse,
            crate::routes::integrations::AuthUrlResponse,
            crate::routes::integrations::DisconnectResponse,
            crate::routes::public::PublicCampaignResponse,
            crate::routes::public::SubmitReviewRequest,
            crate::routes::public::SubmitReviewResponse
        )
    ),
    tags(
        (name = "Health", description = "Service health endpoints"),
        (name = "Auth", description = "Registration and session management"),
        (name = "Users", description = "Clinic profile and onboarding"),
        (name = "Contacts", description = "Patient contact list"),
        (name = "Campaigns", description = "Review request campaigns"),
        (name = "Reviews", description = "Collected reviews and ratings"),
        (name = "Billing", description = "Billing log entries"),
        (name = "Integrations", description = "Google Calendar and Business connections"),
        (name = "Public", description = "Patient-facing review page")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        let schemes = &mut components.security_schemes;

        let mut scheme = SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer));
        if let SecurityScheme::Http(http) = &mut scheme {
            http.bearer_format = Some("Bearer".to_string());
        }

        schemes.insert("bearerAuth".to_string(), scheme);
    }
}
