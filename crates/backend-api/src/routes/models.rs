//! Request and response bodies shared by the HTTP handlers.

use serde::{Deserialize, Deserializer, Serialize};
use smileboard_database::{
    BillingLog, BillingStatus, Campaign, CampaignChannel, CampaignReviewSummary, Connection,
    Contact, ContactOrigin, Review, User,
};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clinic_name: Option<String>,
    /// Plan as stored; `effective_plan` accounts for expiry.
    pub plan: String,
    pub effective_plan: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_expires_at: Option<String>,
    pub onboarding_completed: bool,
    pub google_calendar_connected: bool,
    pub google_business_connected: bool,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        let effective_plan = value.effective_plan(chrono::Utc::now());
        Self {
            id: value.public_id,
            email: value.email,
            display_name: value.display_name,
            clinic_name: value.clinic_name,
            plan: value.plan.to_string(),
            effective_plan: effective_plan.to_string(),
            plan_expires_at: value.plan_expires_at.map(|value| value.to_rfc3339()),
            onboarding_completed: value.onboarding_completed,
            google_calendar_connected: value.google_calendar_connected,
            google_business_connected: value.google_business_connected,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ContactResponse {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[schema(value_type = String, example = "manual")]
    pub origin: ContactOrigin,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Contact> for ContactResponse {
    fn from(value: Contact) -> Self {
        Self {
            id: value.public_id,
            name: value.name,
            email: value.email,
            phone: value.phone,
            origin: value.origin,
            tags: value.tags,
            notes: value.notes,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateContactRequest {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "csv")]
    pub origin: ContactOrigin,
    #[serde(default)]
    pub tags: Vec<String>,
    pub notes: Option<String>,
}

/// Distinguishes an explicit `null` (`Some(None)`) from an absent field
/// (`None`, via `#[serde(default)]`).
fn nullable<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Omitted fields are left unchanged; `null` or `""` clears email, phone and
/// notes.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateContactRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub phone: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub notes: Option<Option<String>>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ContactListQuery {
    /// Only contacts carrying this tag (case-insensitive).
    pub tag: Option<String>,
    /// Substring matched against name, email and phone.
    pub search: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CampaignResponse {
    pub id: String,
    pub name: String,
    #[schema(value_type = String, example = "sms")]
    pub channel: CampaignChannel,
    pub message_template: String,
    pub min_redirect_rating: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Campaign> for CampaignResponse {
    fn from(value: Campaign) -> Self {
        Self {
            id: value.public_id,
            name: value.name,
            channel: value.channel,
            message_template: value.message_template,
            min_redirect_rating: value.min_redirect_rating,
            redirect_url: value.redirect_url,
            is_active: value.is_active,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCampaignRequest {
    pub name: String,
    #[schema(value_type = String, example = "whatsapp")]
    pub channel: CampaignChannel,
    pub message_template: String,
    pub min_redirect_rating: Option<i64>,
    pub redirect_url: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCampaignRequest {
    pub name: Option<String>,
    #[schema(value_type = Option<String>)]
    pub channel: Option<CampaignChannel>,
    pub message_template: Option<String>,
    pub min_redirect_rating: Option<i64>,
    /// `null` or `""` removes the external review link.
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub redirect_url: Option<Option<String>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PreviewQuery {
    /// Contact whose name fills the `{{name}}` placeholder.
    pub contact_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CampaignPreviewResponse {
    pub message: String,
    pub review_link: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewResponse {
    pub id: String,
    pub campaign_id: String,
    pub rating: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer_name: Option<String>,
    pub redirected: bool,
    pub created_at: String,
}

impl From<Review> for ReviewResponse {
    fn from(value: Review) -> Self {
        Self {
            id: value.public_id,
            campaign_id: value.campaign_public_id,
            rating: value.rating,
            comment: value.comment,
            reviewer_name: value.reviewer_name,
            redirected: value.redirected,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewSummaryEntry {
    pub campaign_id: String,
    pub campaign_name: String,
    pub review_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
}

impl From<CampaignReviewSummary> for ReviewSummaryEntry {
    fn from(value: CampaignReviewSummary) -> Self {
        Self {
            campaign_id: value.campaign_public_id,
            campaign_name: value.campaign_name,
            review_count: value.review_count,
            average_rating: value.average_rating,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ReviewListQuery {
    pub campaign_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BillingLogResponse {
    pub id: String,
    pub kind: String,
    pub origin: String,
    pub amount_cents: i64,
    pub currency: String,
    #[schema(value_type = String, example = "paid")]
    pub status: BillingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<BillingLog> for BillingLogResponse {
    fn from(value: BillingLog) -> Self {
        Self {
            id: value.public_id,
            kind: value.kind,
            origin: value.origin,
            amount_cents: value.amount_cents,
            currency: value.currency,
            status: value.status,
            description: value.description,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBillingLogRequest {
    pub kind: String,
    pub origin: String,
    pub amount_cents: i64,
    pub currency: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub status: BillingStatus,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBillingStatusRequest {
    #[schema(value_type = String, example = "failed")]
    pub status: BillingStatus,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct BillingListQuery {
    #[param(value_type = Option<String>)]
    pub status: Option<BillingStatus>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConnectionResponse {
    pub id: String,
    pub provider: String,
    pub email: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    pub has_refresh_token: bool,
    pub updated_at: String,
}

impl From<Connection> for ConnectionResponse {
    fn from(value: Connection) -> Self {
        Self {
            id: value.public_id,
            provider: value.provider.to_string(),
            email: value.email,
            status: value.status.as_str().to_string(),
            expires_at: value.expires_at.map(|value| value.to_rfc3339()),
            scope: value.scope,
            has_refresh_token: value.refresh_token.is_some(),
            updated_at: value.updated_at,
        }
    }
}
