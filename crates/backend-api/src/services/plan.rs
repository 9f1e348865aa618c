use chrono::Utc;
use smileboard_database::{Feature, IntegrationProvider, User};

use super::error::ServiceError;

/// Reject the request unless the user's current plan covers `feature`.
pub fn require_feature(user: &User, feature: Feature) -> Result<(), ServiceError> {
    if user.can_use(feature, Utc::now()) {
        Ok(())
    } else {
        Err(ServiceError::plan_required(feature))
    }
}

pub fn provider_feature(provider: IntegrationProvider) -> Feature {
    match provider {
        IntegrationProvider::GoogleCalendar => Feature::GoogleCalendar,
        IntegrationProvider::GoogleBusiness => Feature::GoogleBusiness,
    }
}
