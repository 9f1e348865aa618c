//! Google Calendar / Business connection lifecycle: consent URL, OAuth
//! callback, token refresh and disconnect.

use serde_json::{json, Value};
use smileboard_database::{
    Connection, ConnectionRepository, IntegrationProvider, UpsertOutcome, User, UserRepository,
};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use super::error::ServiceError;
use super::plan::{provider_feature, require_feature};
use crate::state::{AppState, PendingAuthorization};

pub const SUCCESS_MESSAGE: &str = "google-oauth-success";
pub const ERROR_MESSAGE: &str = "google-oauth-error";

#[derive(Debug, Clone)]
pub struct CallbackResult {
    pub provider: IntegrationProvider,
    pub email: String,
    pub outcome: UpsertOutcome,
    pub connection: Connection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisconnectResult {
    /// Whether Google acknowledged the revoke call.
    pub provider_revoked: bool,
    pub connections_revoked: u64,
}

pub async fn list_connections(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<Connection>, ServiceError> {
    let connections = ConnectionRepository::new(pool.clone())
        .list_for_user(user_id)
        .await?;
    Ok(connections)
}

/// Issue a state bound to `user` and return Google's consent URL.
pub async fn authorization_url(
    state: &AppState,
    user: &User,
    provider: IntegrationProvider,
) -> Result<String, ServiceError> {
    require_feature(user, provider_feature(provider))?;
    let google = state.authenticator().google()?;

    let oauth_state = state
        .oauth_state()
        .issue(PendingAuthorization {
            user_id: user.id,
            provider,
        })
        .await;

    debug!(user = %user.public_id, %provider, "issued google consent url");
    Ok(google.authorize_url(provider, &oauth_state))
}

/// Finish the consent round trip: exchange the code, look up the account
/// email and store the tokens on the user's active connection.
pub async fn complete_callback(
    state: &AppState,
    code: &str,
    oauth_state: &str,
) -> Result<CallbackResult, ServiceError> {
    let pending = state
        .oauth_state()
        .consume(oauth_state)
        .await
        .ok_or_else(|| ServiceError::bad_request("invalid or expired OAuth state"))?;

    let google = state.authenticator().google()?;
    let tokens = google.exchange_code(code).await.map_err(upstream)?;
    let email = google
        .fetch_email(&tokens.access_token)
        .await
        .map_err(upstream)?;

    let (connection, outcome) = ConnectionRepository::new(state.db_pool().clone())
        .upsert_active(pending.user_id, pending.provider, &email, &tokens)
        .await?;

    UserRepository::new(state.db_pool().clone())
        .set_integration_flag(pending.user_id, pending.provider, true)
        .await?;

    info!(
        connection = %connection.public_id,
        provider = %pending.provider,
        ?outcome,
        "google account connected"
    );

    spawn_sync(state, &connection);

    Ok(CallbackResult {
        provider: pending.provider,
        email,
        outcome,
        connection,
    })
}

/// Drop the state of a consent round trip Google reported as failed and
/// return the provider it was started for.
pub async fn abandon_callback(
    state: &AppState,
    oauth_state: Option<&str>,
) -> Option<IntegrationProvider> {
    let oauth_state = oauth_state?;
    state
        .oauth_state()
        .consume(oauth_state)
        .await
        .map(|pending| pending.provider)
}

/// Exchange the stored refresh token for a new access token. The stored
/// refresh token only changes when Google issues a new one.
pub async fn refresh_connection(
    state: &AppState,
    user: &User,
    provider: IntegrationProvider,
) -> Result<Connection, ServiceError> {
    let connections = ConnectionRepository::new(state.db_pool().clone());
    let connection = connections
        .find_active(user.id, provider)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("no active {provider} connection")))?;

    let refresh_token = connection
        .refresh_token
        .as_deref()
        .ok_or_else(|| ServiceError::bad_request("connection has no refresh token"))?;

    let google = state.authenticator().google()?;
    let tokens = google.refresh(refresh_token).await.map_err(upstream)?;
    let updated = connections.update_tokens(connection.id, &tokens).await?;

    info!(connection = %updated.public_id, %provider, "refreshed google access token");
    Ok(updated)
}

/// Revoke the grant at Google once, then mark every active connection for
/// the provider revoked and clear the user's flag. A failed revoke call is
/// logged and otherwise ignored.
pub async fn disconnect(
    state: &AppState,
    user: &User,
    provider: IntegrationProvider,
) -> Result<DisconnectResult, ServiceError> {
    let connections = ConnectionRepository::new(state.db_pool().clone());
    let connection = connections
        .find_active(user.id, provider)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("no active {provider} connection")))?;

    let token = connection
        .refresh_token
        .as_deref()
        .unwrap_or(&connection.access_token);

    let provider_revoked = match state.authenticator().google() {
        Ok(google) => match google.revoke(token).await {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    connection = %connection.public_id,
                    error = %format!("{err:#}"),
                    "google token revocation failed"
                );
                false
            }
        },
        Err(err) => {
            warn!(error = %err, "skipping google token revocation");
            false
        }
    };

    let connections_revoked = connections.revoke_active(user.id, provider).await?;
    UserRepository::new(state.db_pool().clone())
        .set_integration_flag(user.id, provider, false)
        .await?;

    info!(
        user = %user.public_id,
        %provider,
        connections_revoked,
        provider_revoked,
        "google account disconnected"
    );

    Ok(DisconnectResult {
        provider_revoked,
        connections_revoked,
    })
}

/// Notify the downstream sync endpoint about a new connection. The request
/// runs detached; its outcome is only logged.
fn spawn_sync(state: &AppState, connection: &Connection) {
    let Some(url) = state.integrations().sync_webhook_url.clone() else {
        return;
    };

    let http = state.http().clone();
    let payload = json!({
        "event": "integration.connected",
        "connection_id": connection.public_id,
        "provider": connection.provider.as_str(),
        "email": connection.email,
    });

    tokio::spawn(async move {
        match http.post(&url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                debug!(%url, "integration sync accepted");
            }
            Ok(response) => {
                warn!(%url, status = %response.status(), "integration sync rejected");
            }
            Err(err) => {
                warn!(%url, error = %err, "integration sync request failed");
            }
        }
    });
}

fn upstream(err: anyhow::Error) -> ServiceError {
    ServiceError::upstream(format!("{err:#}"))
}

pub fn success_message(result: &CallbackResult) -> Value {
    json!({
        "type": SUCCESS_MESSAGE,
        "provider": result.provider.as_str(),
        "email": result.email,
    })
}

pub fn error_message(provider: Option<IntegrationProvider>, error: &str) -> Value {
    json!({
        "type": ERROR_MESSAGE,
        "provider": provider.map(|provider| provider.as_str()),
        "error": error,
    })
}

const POPUP_TEMPLATE: &str = r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>Smileboard</title></head>
<body>
<p>You can close this window.</p>
<script>
(function () {
  var message = __MESSAGE__;
  var origins = __ORIGINS__;
  if (window.opener) {
    origins.forEach(function (origin) {
      try { window.opener.postMessage(message, origin); } catch (e) {}
    });
  }
  window.close();
})();
</script>
</body>
</html>
"#;

/// Page served to the consent popup: posts `message` to the opener for each
/// allowed origin, then closes itself.
pub fn render_popup_page(allowed_origins: &[String], message: &Value) -> String {
    let origins = Value::from(allowed_origins.to_vec());
    POPUP_TEMPLATE
        .replace("__MESSAGE__", &script_safe(&message.to_string()))
        .replace("__ORIGINS__", &script_safe(&origins.to_string()))
}

/// JSON is valid JavaScript, but `<` could close the surrounding script tag.
fn script_safe(json: &str) -> String {
    json.replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn popup_page_targets_each_allowed_origin() {
        let origins = vec![
            "https://app.example".to_string(),
            "http://localhost:5173".to_string(),
        ];
        let message = error_message(Some(IntegrationProvider::GoogleBusiness), "access_denied");

        let page = render_popup_page(&origins, &message);
        assert!(page.contains(r#"["https://app.example","http://localhost:5173"]"#));
        assert!(page.contains(ERROR_MESSAGE));
        assert!(page.contains("google_business"));
        assert!(page.contains("window.close()"));
    }

    #[test]
    fn popup_page_escapes_markup_in_payload() {
        let message = error_message(None, "</script><script>alert(1)</script>");
        let page = render_popup_page(&[], &message);

        assert_eq!(page.matches("</script>").count(), 1);
        assert!(page.contains("\\u003c/script\\u003e"));
    }
}
