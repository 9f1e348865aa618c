use smileboard_database::{
    entities::campaign::{is_valid_rating, MAX_RATING, MIN_RATING},
    Campaign, CampaignRepository, ContactRepository, CreateCampaignRequest, UpdateCampaignRequest,
    User,
};
use sqlx::SqlitePool;

use super::error::ServiceError;

pub const DEFAULT_MIN_REDIRECT_RATING: i64 = 4;

/// Message rendered for one recipient plus the link it points at.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedMessage {
    pub message: String,
    pub review_link: String,
}

pub async fn list_campaigns(pool: &SqlitePool, user_id: i64) -> Result<Vec<Campaign>, ServiceError> {
    let campaigns = CampaignRepository::new(pool.clone()).list(user_id).await?;
    Ok(campaigns)
}

pub async fn create_campaign(
    pool: &SqlitePool,
    user_id: i64,
    request: CreateCampaignRequest,
) -> Result<Campaign, ServiceError> {
    if request.name.trim().is_empty() {
        return Err(ServiceError::bad_request("campaign name must not be empty"));
    }
    validate_threshold(request.min_redirect_rating)?;
    let request = CreateCampaignRequest {
        redirect_url: normalize_redirect_url(request.redirect_url)?,
        ..request
    };

    let campaign = CampaignRepository::new(pool.clone())
        .create(user_id, &request)
        .await?;
    Ok(campaign)
}

pub async fn get_campaign(
    pool: &SqlitePool,
    user_id: i64,
    campaign_id: &str,
) -> Result<Campaign, ServiceError> {
    CampaignRepository::new(pool.clone())
        .find(user_id, campaign_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("campaign not found"))
}

pub async fn update_campaign(
    pool: &SqlitePool,
    user_id: i64,
    campaign_id: &str,
    request: UpdateCampaignRequest,
) -> Result<Campaign, ServiceError> {
    if matches!(request.name.as_deref(), Some(name) if name.trim().is_empty()) {
        return Err(ServiceError::bad_request("campaign name must not be empty"));
    }
    if let Some(threshold) = request.min_redirect_rating {
        validate_threshold(threshold)?;
    }
    let request = UpdateCampaignRequest {
        redirect_url: request
            .redirect_url
            .map(normalize_redirect_url)
            .transpose()?,
        ..request
    };

    CampaignRepository::new(pool.clone())
        .update(user_id, campaign_id, &request)
        .await?
        .ok_or_else(|| ServiceError::not_found("campaign not found"))
}

pub async fn delete_campaign(
    pool: &SqlitePool,
    user_id: i64,
    campaign_id: &str,
) -> Result<(), ServiceError> {
    let deleted = CampaignRepository::new(pool.clone())
        .delete(user_id, campaign_id)
        .await?;
    if deleted {
        Ok(())
    } else {
        Err(ServiceError::not_found("campaign not found"))
    }
}

/// Render the campaign message as a given contact would receive it.
pub async fn preview_campaign(
    pool: &SqlitePool,
    user: &User,
    campaign_id: &str,
    contact_id: Option<&str>,
    public_base_url: &str,
) -> Result<RenderedMessage, ServiceError> {
    let campaign = get_campaign(pool, user.id, campaign_id).await?;

    let recipient = match contact_id {
        Some(contact_id) => ContactRepository::new(pool.clone())
            .find(user.id, contact_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("contact not found"))?
            .name,
        None => "there".to_string(),
    };

    let review_link = review_page_url(public_base_url, &campaign.public_id);
    let clinic = user.clinic_name.as_deref().unwrap_or_default();

    Ok(RenderedMessage {
        message: render_template(&campaign.message_template, &recipient, clinic, &review_link),
        review_link,
    })
}

/// Public page a patient opens to leave a review for `campaign_id`.
pub fn review_page_url(public_base_url: &str, campaign_id: &str) -> String {
    format!("{}/review/{campaign_id}", public_base_url.trim_end_matches('/'))
}

/// Substitute `{{name}}`, `{{clinic}}` and `{{link}}`. Unknown placeholders
/// are left untouched.
pub fn render_template(template: &str, name: &str, clinic: &str, link: &str) -> String {
    let mut rendered = String::with_capacity(template.len() + link.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        rendered.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            rest = &rest[start..];
            break;
        };

        match after[..end].trim() {
            "name" => rendered.push_str(name),
            "clinic" => rendered.push_str(clinic),
            "link" => rendered.push_str(link),
            _ => rendered.push_str(&rest[start..start + end + 4]),
        }
        rest = &after[end + 2..];
    }

    rendered.push_str(rest);
    rendered
}

fn validate_threshold(threshold: i64) -> Result<(), ServiceError> {
    if is_valid_rating(threshold) {
        Ok(())
    } else {
        Err(ServiceError::bad_request(format!(
            "min_redirect_rating must be between {MIN_RATING} and {MAX_RATING}"
        )))
    }
}

fn normalize_redirect_url(url: Option<String>) -> Result<Option<String>, ServiceError> {
    let Some(url) = url.map(|url| url.trim().to_string()) else {
        return Ok(None);
    };
    if url.is_empty() {
        return Ok(None);
    }
    if url.starts_with("https://") || url.starts_with("http://") {
        Ok(Some(url))
    } else {
        Err(ServiceError::bad_request(
            "redirect_url must be an http(s) link",
        ))
    }
}
