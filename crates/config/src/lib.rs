use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "smileboard.toml",
    "config/smileboard.toml",
    "crates/config/smileboard.toml",
    "../smileboard.toml",
    "../config/smileboard.toml",
    "../crates/config/smileboard.toml",
];

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub integrations: IntegrationsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 7070,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://smileboard.db".to_string(),
            max_connections: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "AuthConfig::default_session_ttl")]
    pub session_ttl_seconds: u64,
    #[serde(default)]
    pub google: GoogleAuthConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_seconds: Self::default_session_ttl(),
            google: GoogleAuthConfig::default(),
        }
    }
}

impl AuthConfig {
    const fn default_session_ttl() -> u64 {
        86_400
    }
}

/// Google OAuth2 client registration and endpoint locations.
///
/// The endpoints default to Google's production URLs and only need to be
/// overridden when pointing the backend at a stand-in server.
///
/// ```
/// use smileboard_config::GoogleAuthConfig;
///
/// let google = GoogleAuthConfig::default();
/// assert_eq!(google.token_url, "https://oauth2.googleapis.com/token");
/// assert!(google.client_id.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleAuthConfig {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default = "GoogleAuthConfig::default_redirect_uri")]
    pub redirect_uri: String,
    #[serde(default = "GoogleAuthConfig::default_auth_url")]
    pub auth_url: String,
    #[serde(default = "GoogleAuthConfig::default_token_url")]
    pub token_url: String,
    #[serde(default = "GoogleAuthConfig::default_revoke_url")]
    pub revoke_url: String,
    #[serde(default = "GoogleAuthConfig::default_userinfo_url")]
    pub userinfo_url: String,
}

impl GoogleAuthConfig {
    fn default_redirect_uri() -> String {
        "http://127.0.0.1:7070/api/integrations/google/callback".to_string()
    }

    fn default_auth_url() -> String {
        "https://accounts.google.com/o/oauth2/v2/auth".to_string()
    }

    fn default_token_url() -> String {
        "https://oauth2.googleapis.com/token".to_string()
    }

    fn default_revoke_url() -> String {
        "https://oauth2.googleapis.com/revoke".to_string()
    }

    fn default_userinfo_url() -> String {
        "https://www.googleapis.com/oauth2/v2/userinfo".to_string()
    }
}

impl Default for GoogleAuthConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: Self::default_redirect_uri(),
            auth_url: Self::default_auth_url(),
            token_url: Self::default_token_url(),
            revoke_url: Self::default_revoke_url(),
            userinfo_url: Self::default_userinfo_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationsConfig {
    /// Origins the OAuth popup is allowed to report back to.
    #[serde(default = "IntegrationsConfig::default_allowed_origins")]
    pub allowed_origins: Vec<String>,
    /// Base URL of the public review page, used to build campaign links.
    #[serde(default = "IntegrationsConfig::default_public_base_url")]
    pub public_base_url: String,
    /// Downstream endpoint notified after a successful Google connection.
    #[serde(default)]
    pub sync_webhook_url: Option<String>,
}

impl IntegrationsConfig {
    fn default_allowed_origins() -> Vec<String> {
        vec![
            "http://localhost:5173".to_string(),
            "http://localhost:3000".to_string(),
        ]
    }

    fn default_public_base_url() -> String {
        "http://localhost:5173".to_string()
    }
}

impl Default for IntegrationsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Self::default_allowed_origins(),
            public_base_url: Self::default_public_base_url(),
            sync_webhook_url: None,
        }
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use smileboard_config::load;
///
/// std::env::remove_var("SMILEBOARD_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let session_ttl_i64 = i64::try_from(defaults.auth.session_ttl_seconds).unwrap_or(i64::MAX);

    let mut builder = config::Config::builder()
        .set_default("http.address", defaults.http.address.clone())?
        .set_default("http.port", i64::from(defaults.http.port))?
        .set_default("database.url", defaults.database.url.clone())?
        .set_default(
            "database.max_connections",
            i64::from(defaults.database.max_connections),
        )?
        .set_default("auth.session_ttl_seconds", session_ttl_i64)?
        .set_default(
            "integrations.allowed_origins",
            defaults.integrations.allowed_origins.clone(),
        )?
        .set_default(
            "integrations.public_base_url",
            defaults.integrations.public_base_url.clone(),
        )?;

    let environment_overrides = config::Environment::with_prefix("SMILEBOARD")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("integrations.allowed_origins");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("SMILEBOARD_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via SMILEBOARD_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let mut config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    if config.auth.session_ttl_seconds > i64::MAX as u64 {
        config.auth.session_ttl_seconds = i64::MAX as u64;
    }

    debug!(
        address = %config.http.address,
        port = config.http.port,
        database = %config.database.url,
        google_enabled = config.auth.google.client_id.is_some(),
        "loaded backend configuration"
    );
    Ok(config)
}
