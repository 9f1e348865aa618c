//! Google OAuth2 client used by the Calendar and Business integrations.

use anyhow::{bail, Context};
use chrono::{Duration, Utc};
use oauth2::basic::{BasicClient, BasicTokenResponse};
use oauth2::reqwest::async_http_client;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, RedirectUrl, RefreshToken,
    Scope, TokenResponse, TokenUrl,
};
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use smileboard_config::GoogleAuthConfig;
use smileboard_database::{IntegrationProvider, TokenSet};
use tracing::debug;

pub const EMAIL_SCOPE: &str = "email";
const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";
const BUSINESS_SCOPE: &str = "https://www.googleapis.com/auth/business.manage";

/// Scopes requested for a provider, the profile email scope included.
pub fn provider_scopes(provider: IntegrationProvider) -> [&'static str; 2] {
    match provider {
        IntegrationProvider::GoogleCalendar => [CALENDAR_SCOPE, EMAIL_SCOPE],
        IntegrationProvider::GoogleBusiness => [BUSINESS_SCOPE, EMAIL_SCOPE],
    }
}

#[derive(Clone)]
pub struct GoogleOAuth {
    client: BasicClient,
    http: reqwest::Client,
    userinfo_url: String,
    revoke_url: String,
}

impl GoogleOAuth {
    /// Build a client when both credentials are configured.
    pub fn from_config(config: &GoogleAuthConfig) -> anyhow::Result<Option<Self>> {
        let (Some(client_id), Some(client_secret)) =
            (config.client_id.clone(), config.client_secret.clone())
        else {
            return Ok(None);
        };
        Self::new(config, client_id, client_secret).map(Some)
    }

    pub fn new(
        config: &GoogleAuthConfig,
        client_id: String,
        client_secret: String,
    ) -> anyhow::Result<Self> {
        let client = BasicClient::new(
            ClientId::new(client_id),
            Some(ClientSecret::new(client_secret)),
            AuthUrl::new(config.auth_url.clone()).context("invalid google auth url")?,
            Some(TokenUrl::new(config.token_url.clone()).context("invalid google token url")?),
        )
        .set_auth_type(oauth2::AuthType::RequestBody)
        .set_redirect_uri(
            RedirectUrl::new(config.redirect_uri.clone())
                .context("invalid redirect uri for google oauth")?,
        );

        let http = reqwest::Client::builder()
            .user_agent("smileboard-backend")
            .build()
            .context("failed to build google http client")?;

        Ok(Self {
            client,
            http,
            userinfo_url: config.userinfo_url.clone(),
            revoke_url: config.revoke_url.clone(),
        })
    }

    /// Consent URL asking for offline access so Google hands out a refresh token.
    pub fn authorize_url(&self, provider: IntegrationProvider, state: &str) -> String {
        let mut request = self
            .client
            .authorize_url(|| CsrfToken::new(state.to_owned()));
        for scope in provider_scopes(provider) {
            request = request.add_scope(Scope::new(scope.to_string()));
        }
        let (url, _) = request
            .add_extra_param("access_type", "offline")
            .add_extra_param("prompt", "consent")
            .add_extra_param("include_granted_scopes", "true")
            .url();

        url.to_string()
    }

    pub async fn exchange_code(&self, code: &str) -> anyhow::Result<TokenSet> {
        let response = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_owned()))
            .request_async(async_http_client)
            .await
            .context("failed to exchange google oauth code")?;

        Ok(token_set(&response))
    }

    pub async fn refresh(&self, refresh_token: &str) -> anyhow::Result<TokenSet> {
        let response = self
            .client
            .exchange_refresh_token(&RefreshToken::new(refresh_token.to_owned()))
            .request_async(async_http_client)
            .await
            .context("failed to refresh google access token")?;

        Ok(token_set(&response))
    }

    /// Email address of the Google account the token belongs to.
    pub async fn fetch_email(&self, access_token: &str) -> anyhow::Result<String> {
        let profile: GoogleUserInfo = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .context("failed to call google userinfo api")?
            .error_for_status()
            .context("google userinfo api returned error")?
            .json()
            .await
            .context("failed to decode google userinfo response")?;

        debug!(id = ?profile.id, "fetched google profile");

        match profile.email {
            Some(email) if !email.trim().is_empty() => Ok(email),
            _ => bail!("google profile did not include an email address"),
        }
    }

    /// Revoke a token. Google invalidates the whole grant, so either the
    /// access or the refresh token will do.
    pub async fn revoke(&self, token: &str) -> anyhow::Result<()> {
        self.http
            .post(&self.revoke_url)
            .query(&[("token", token)])
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .send()
            .await
            .context("failed to call google revoke endpoint")?
            .error_for_status()
            .context("google revoke endpoint returned error")?;

        Ok(())
    }
}

fn token_set(response: &BasicTokenResponse) -> TokenSet {
    let expires_at = response
        .expires_in()
        .and_then(|lifetime| Duration::from_std(lifetime).ok())
        .map(|lifetime| Utc::now() + lifetime);

    let scope = response.scopes().map(|scopes| {
        scopes
            .iter()
            .map(|scope| scope.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    });

    TokenSet {
        access_token: response.access_token().secret().clone(),
        refresh_token: response
            .refresh_token()
            .map(|token| token.secret().clone()),
        expires_at,
        scope,
    }
}

#[derive(Deserialize)]
struct GoogleUserInfo {
    id: Option<String>,
    email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_provider_requests_the_email_scope() {
        for provider in [
            IntegrationProvider::GoogleCalendar,
            IntegrationProvider::GoogleBusiness,
        ] {
            assert!(provider_scopes(provider).contains(&EMAIL_SCOPE));
        }
    }

    #[test]
    fn from_config_requires_both_credentials() {
        let mut config = GoogleAuthConfig::default();
        assert!(GoogleOAuth::from_config(&config).unwrap().is_none());

        config.client_id = Some("client".into());
        assert!(GoogleOAuth::from_config(&config).unwrap().is_none());

        config.client_secret = Some("secret".into());
        assert!(GoogleOAuth::from_config(&config).unwrap().is_some());
    }

    #[test]
    fn from_config_rejects_malformed_endpoints() {
        let config = GoogleAuthConfig {
            client_id: Some("client".into()),
            client_secret: Some("secret".into()),
            token_url: "not a url".into(),
            ..GoogleAuthConfig::default()
        };
        assert!(GoogleOAuth::from_config(&config).is_err());
    }
}
