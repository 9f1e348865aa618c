use smileboard_database::{
    entities::campaign::{is_valid_rating, MAX_RATING, MIN_RATING},
    Campaign, CampaignRepository, CampaignReviewSummary, CreateReviewRequest, Review,
    ReviewRepository, UserRepository,
};
use sqlx::SqlitePool;
use tracing::info;

use super::error::ServiceError;

/// What the public review page needs to render a campaign.
#[derive(Debug, Clone)]
pub struct PublicCampaign {
    pub campaign: Campaign,
    pub clinic_name: Option<String>,
}

/// Anonymous review as submitted from the public page.
#[derive(Debug, Clone)]
pub struct ReviewSubmission {
    pub rating: i64,
    pub comment: Option<String>,
    pub reviewer_name: Option<String>,
    pub submitter_ip: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SubmittedReview {
    pub review: Review,
    pub redirect_url: Option<String>,
}

pub async fn list_reviews(
    pool: &SqlitePool,
    user_id: i64,
    campaign_id: Option<&str>,
) -> Result<Vec<Review>, ServiceError> {
    let reviews = ReviewRepository::new(pool.clone())
        .list_for_user(user_id, campaign_id)
        .await?;
    Ok(reviews)
}

pub async fn review_summary(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<CampaignReviewSummary>, ServiceError> {
    let summary = ReviewRepository::new(pool.clone())
        .summary_for_user(user_id)
        .await?;
    Ok(summary)
}

pub async fn public_campaign(
    pool: &SqlitePool,
    campaign_id: &str,
) -> Result<PublicCampaign, ServiceError> {
    let campaign = CampaignRepository::new(pool.clone())
        .find_by_public_id(campaign_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("campaign not found"))?;

    let clinic_name = UserRepository::new(pool.clone())
        .find_by_id(campaign.user_id)
        .await?
        .and_then(|owner| owner.clinic_name);

    Ok(PublicCampaign {
        campaign,
        clinic_name,
    })
}

/// Store an anonymous review and decide whether the reviewer is sent on to
/// the campaign's external review link.
pub async fn submit_review(
    pool: &SqlitePool,
    campaign_id: &str,
    submission: ReviewSubmission,
) -> Result<SubmittedReview, ServiceError> {
    if !is_valid_rating(submission.rating) {
        return Err(ServiceError::bad_request(format!(
            "rating must be between {MIN_RATING} and {MAX_RATING}"
        )));
    }

    let campaign = CampaignRepository::new(pool.clone())
        .find_by_public_id(campaign_id)
        .await?
        .filter(|campaign| campaign.is_active)
        .ok_or_else(|| ServiceError::not_found("campaign not found"))?;

    let redirect_url = campaign.redirect_for(submission.rating).map(str::to_string);

    let review = ReviewRepository::new(pool.clone())
        .insert(
            campaign.id,
            &CreateReviewRequest {
                rating: submission.rating,
                comment: non_blank(submission.comment),
                reviewer_name: non_blank(submission.reviewer_name),
                submitter_ip: submission.submitter_ip,
                redirected: redirect_url.is_some(),
            },
        )
        .await?;

    info!(
        campaign = %campaign.public_id,
        rating = review.rating,
        redirected = review.redirected,
        "review submitted"
    );

    Ok(SubmittedReview {
        review,
        redirect_url,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_utils::{create_test_db, create_test_user};
    use smileboard_database::{CampaignChannel, CreateCampaignRequest, Plan};

    async fn seed_campaign(pool: &SqlitePool, is_active: bool) -> Campaign {
        let user = create_test_user(pool, "clinic", Plan::Starter, None).await;
        CampaignRepository::new(pool.clone())
            .create(
                user.id,
                &CreateCampaignRequest {
                    name: "Checkup".into(),
                    channel: CampaignChannel::Sms,
                    message_template: "Hi {{name}}".into(),
                    min_redirect_rating: 4,
                    redirect_url: Some("https://g.page/r/bright/review".into()),
                    is_active,
                },
            )
            .await
            .expect("campaign created")
    }

    fn submission(rating: i64) -> ReviewSubmission {
        ReviewSubmission {
            rating,
            comment: Some("  ".into()),
            reviewer_name: Some("Ana".into()),
            submitter_ip: Some("203.0.113.5".into()),
        }
    }

    #[tokio::test]
    async fn high_rating_redirects_and_low_rating_stays() {
        let (pool, _dir) = create_test_db().await;
        let campaign = seed_campaign(&pool, true).await;

        let happy = submit_review(&pool, &campaign.public_id, submission(5))
            .await
            .expect("review stored");
        assert_eq!(
            happy.redirect_url.as_deref(),
            Some("https://g.page/r/bright/review")
        );
        assert!(happy.review.redirected);
        assert_eq!(happy.review.comment, None);

        let unhappy = submit_review(&pool, &campaign.public_id, submission(3))
            .await
            .expect("review stored");
        assert_eq!(unhappy.redirect_url, None);
        assert!(!unhappy.review.redirected);
    }

    #[tokio::test]
    async fn out_of_range_rating_is_rejected_before_lookup() {
        let (pool, _dir) = create_test_db().await;

        for rating in [0, 6] {
            let result = submit_review(&pool, "missing", submission(rating)).await;
            assert!(matches!(result, Err(ServiceError::BadRequest(_))));
        }
    }

    #[tokio::test]
    async fn inactive_campaign_does_not_accept_reviews() {
        let (pool, _dir) = create_test_db().await;
        let campaign = seed_campaign(&pool, false).await;

        let result = submit_review(&pool, &campaign.public_id, submission(5)).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));

        let public = public_campaign(&pool, &campaign.public_id)
            .await
            .expect("inactive campaigns are still described");
        assert!(!public.campaign.is_active);
        assert_eq!(public.clinic_name.as_deref(), Some("Bright Smiles"));
    }
}
