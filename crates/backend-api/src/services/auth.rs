use smileboard_auth::{AuthSession, Authenticator, Registration};
use smileboard_database::User;
use tracing::info;

use super::error::ServiceError;
use crate::routes::auth::SessionResponse;

/// Create the account and sign it straight in.
pub async fn register(
    authenticator: &Authenticator,
    registration: Registration<'_>,
) -> Result<(AuthSession, User), ServiceError> {
    let user = authenticator
        .register_with_password(registration.clone())
        .await?;
    let session = authenticator
        .login_with_password(registration.email, registration.password)
        .await?;

    Ok((session, user))
}

pub async fn login(
    authenticator: &Authenticator,
    email: &str,
    password: &str,
) -> Result<(AuthSession, User), ServiceError> {
    let session = authenticator.login_with_password(email, password).await?;
    let user = authenticator.user_profile(session.user_id).await?;

    info!(user = %user.public_id, "password login");
    Ok((session, user))
}

pub async fn logout(authenticator: &Authenticator, token: &str) -> Result<(), ServiceError> {
    authenticator.logout(token).await?;
    Ok(())
}

pub fn create_session_response(session: AuthSession, user: User) -> SessionResponse {
    SessionResponse::new(session, user)
}
