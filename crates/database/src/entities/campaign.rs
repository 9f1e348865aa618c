//! Campaign entity definitions

use std::fmt;

use serde::{Deserialize, Serialize};

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

/// Review-solicitation campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: i64,
    pub public_id: String,
    pub user_id: i64,
    pub name: String,
    pub channel: CampaignChannel,
    pub message_template: String,
    pub min_redirect_rating: i64,
    pub redirect_url: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl Campaign {
    /// External link the reviewer is sent to, if `rating` clears the threshold.
    pub fn redirect_for(&self, rating: i64) -> Option<&str> {
        if rating >= self.min_redirect_rating {
            self.redirect_url.as_deref()
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateCampaignRequest {
    pub name: String,
    pub channel: CampaignChannel,
    pub message_template: String,
    pub min_redirect_rating: i64,
    pub redirect_url: Option<String>,
    pub is_active: bool,
}

/// Partial update. `None` keeps a column; `Some(None)` on `redirect_url`
/// clears the link.
#[derive(Debug, Clone, Default)]
pub struct UpdateCampaignRequest {
    pub name: Option<String>,
    pub channel: Option<CampaignChannel>,
    pub message_template: Option<String>,
    pub min_redirect_rating: Option<i64>,
    pub redirect_url: Option<Option<String>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignChannel {
    Email,
    Sms,
    Whatsapp,
}

impl CampaignChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignChannel::Email => "email",
            CampaignChannel::Sms => "sms",
            CampaignChannel::Whatsapp => "whatsapp",
        }
    }
}

impl From<&str> for CampaignChannel {
    fn from(s: &str) -> Self {
        match s {
            "sms" => CampaignChannel::Sms,
            "whatsapp" => CampaignChannel::Whatsapp,
            _ => CampaignChannel::Email,
        }
    }
}

impl fmt::Display for CampaignChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn is_valid_rating(rating: i64) -> bool {
    (MIN_RATING..=MAX_RATING).contains(&rating)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn campaign(min_redirect_rating: i64, redirect_url: Option<&str>) -> Campaign {
        Campaign {
            id: 1,
            public_id: "spring-recall".into(),
            user_id: 1,
            name: "Spring recall".into(),
            channel: CampaignChannel::Sms,
            message_template: "Hi {{name}}".into(),
            min_redirect_rating,
            redirect_url: redirect_url.map(str::to_string),
            is_active: true,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn rating_at_threshold_redirects() {
        let campaign = campaign(4, Some("https://g.page/r/clinic/review"));
        assert_eq!(
            campaign.redirect_for(4),
            Some("https://g.page/r/clinic/review")
        );
        assert_eq!(
            campaign.redirect_for(5),
            Some("https://g.page/r/clinic/review")
        );
    }

    #[test]
    fn rating_below_threshold_stays() {
        let campaign = campaign(4, Some("https://g.page/r/clinic/review"));
        assert_eq!(campaign.redirect_for(3), None);
        assert_eq!(campaign.redirect_for(1), None);
    }

    #[test]
    fn missing_link_never_redirects() {
        assert_eq!(campaign(1, None).redirect_for(5), None);
    }

    #[test]
    fn rating_bounds() {
        assert!(!is_valid_rating(0));
        assert!(is_valid_rating(1));
        assert!(is_valid_rating(5));
        assert!(!is_valid_rating(6));
    }
}
