//! Review entity definitions

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub public_id: String,
    pub campaign_id: i64,
    pub campaign_public_id: String,
    pub rating: i64,
    pub comment: Option<String>,
    pub reviewer_name: Option<String>,
    pub submitter_ip: Option<String>,
    pub redirected: bool,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct CreateReviewRequest {
    pub rating: i64,
    pub comment: Option<String>,
    pub reviewer_name: Option<String>,
    pub submitter_ip: Option<String>,
    pub redirected: bool,
}

/// Aggregated ratings for one campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignReviewSummary {
    pub campaign_public_id: String,
    pub campaign_name: String,
    pub review_count: i64,
    pub average_rating: Option<f64>,
}
