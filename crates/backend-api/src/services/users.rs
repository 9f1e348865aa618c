use smileboard_database::{UpdateUserRequest, User, UserRepository};
use sqlx::SqlitePool;

use super::error::ServiceError;

pub async fn update_profile(
    pool: &SqlitePool,
    user_id: i64,
    request: UpdateUserRequest,
) -> Result<User, ServiceError> {
    let request = UpdateUserRequest {
        display_name: trimmed(request.display_name),
        clinic_name: trimmed(request.clinic_name),
    };

    let user = UserRepository::new(pool.clone())
        .update_profile(user_id, &request)
        .await?;
    Ok(user)
}

pub async fn complete_onboarding(pool: &SqlitePool, user_id: i64) -> Result<User, ServiceError> {
    let user = UserRepository::new(pool.clone())
        .complete_onboarding(user_id)
        .await?;
    Ok(user)
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
