//! Test plan for the `smileboard-config` crate.
//!
//! These tests exercise the configuration loader across default handling,
//! file discovery, environment overrides, and validation behaviour.

use std::fs;
use std::path::{Path, PathBuf};

use serial_test::serial;
use tempfile::TempDir;

use smileboard_config::{load, AppConfig, AuthConfig, HttpConfig, IntegrationsConfig};

const ENV_VARS_TO_RESET: &[&str] = &[
    "SMILEBOARD_CONFIG",
    "SMILEBOARD__AUTH__GOOGLE__CLIENT_ID",
    "SMILEBOARD__AUTH__GOOGLE__CLIENT_SECRET",
    "SMILEBOARD__AUTH__GOOGLE__TOKEN_URL",
    "SMILEBOARD__AUTH__SESSION_TTL_SECONDS",
    "SMILEBOARD__DATABASE__MAX_CONNECTIONS",
    "SMILEBOARD__DATABASE__URL",
    "SMILEBOARD__HTTP__ADDRESS",
    "SMILEBOARD__HTTP__PORT",
    "SMILEBOARD__INTEGRATIONS__ALLOWED_ORIGINS",
    "SMILEBOARD__INTEGRATIONS__SYNC_WEBHOOK_URL",
];

struct TestContext {
    vars: Vec<(String, Option<String>)>,
    original_dir: Option<PathBuf>,
}

impl TestContext {
    fn new() -> Self {
        Self {
            vars: Vec::new(),
            original_dir: None,
        }
    }

    fn reset_environment(&mut self) {
        for key in ENV_VARS_TO_RESET {
            self.remove_var(key);
        }
    }

    fn set_var(&mut self, key: &str, value: impl AsRef<str>) {
        let previous = std::env::var(key).ok();
        std::env::set_var(key, value.as_ref());
        self.vars.push((key.to_string(), previous));
    }

    fn remove_var(&mut self, key: &str) {
        let previous = std::env::var(key).ok();
        std::env::remove_var(key);
        self.vars.push((key.to_string(), previous));
    }

    fn set_current_dir(&mut self, dir: &Path) {
        if self.original_dir.is_none() {
            self.original_dir =
                Some(std::env::current_dir().expect("failed to capture current directory"));
        }
        std::env::set_current_dir(dir).expect("failed to set current directory");
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        if let Some(original) = self.original_dir.take() {
            let _ = std::env::set_current_dir(original);
        }

        while let Some((key, value)) = self.vars.pop() {
            match value {
                Some(val) => std::env::set_var(&key, val),
                None => std::env::remove_var(&key),
            }
        }
    }
}

fn write_config_file(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create config directories");
    }
    fs::write(path, contents).expect("failed to write config file");
}

fn isolated() -> (TempDir, TestContext) {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let mut ctx = TestContext::new();
    ctx.reset_environment();
    ctx.set_current_dir(temp_dir.path());
    (temp_dir, ctx)
}

#[test]
#[serial]
fn load_uses_default_values_when_no_files_found() {
    let (_temp_dir, _ctx) = isolated();

    let config = load().expect("configuration load should succeed without files");
    let defaults = AppConfig::default();

    assert_eq!(config.http.address, defaults.http.address);
    assert_eq!(config.http.port, defaults.http.port);
    assert_eq!(config.database.url, defaults.database.url);
    assert_eq!(
        config.database.max_connections,
        defaults.database.max_connections
    );
    assert_eq!(config.auth.session_ttl_seconds, defaults.auth.session_ttl_seconds);
    assert!(config.auth.google.client_id.is_none());
    assert_eq!(config.auth.google.auth_url, defaults.auth.google.auth_url);
    assert_eq!(
        config.integrations.allowed_origins,
        defaults.integrations.allowed_origins
    );
    assert!(config.integrations.sync_webhook_url.is_none());
}

#[test]
#[serial]
fn load_picks_first_available_file_in_search_order() {
    let (temp_dir, _ctx) = isolated();

    write_config_file(
        temp_dir.path(),
        "smileboard.toml",
        r#"
        [http]
        port = 4242
        "#,
    );
    write_config_file(
        temp_dir.path(),
        "config/smileboard.toml",
        r#"
        [http]
        port = 5151
        "#,
    );

    let config = load().expect("configuration load should pick the first file");
    assert_eq!(config.http.port, 4242);
}

#[test]
#[serial]
fn load_merges_partial_file_with_defaults() {
    let (temp_dir, _ctx) = isolated();

    write_config_file(
        temp_dir.path(),
        "smileboard.toml",
        r#"
        [database]
        max_connections = 50

        [auth.google]
        client_id = "clinic-client"
        client_secret = "clinic-secret"

        [integrations]
        sync_webhook_url = "https://sync.example.com/hook"
        "#,
    );

    let config = load().expect("configuration load should succeed");
    let defaults = AppConfig::default();

    assert_eq!(config.http.port, defaults.http.port);
    assert_eq!(config.database.max_connections, 50);
    assert_eq!(config.database.url, defaults.database.url);
    assert_eq!(config.auth.google.client_id.as_deref(), Some("clinic-client"));
    assert_eq!(
        config.auth.google.token_url, defaults.auth.google.token_url,
        "unspecified google endpoints keep their defaults"
    );
    assert_eq!(
        config.integrations.sync_webhook_url.as_deref(),
        Some("https://sync.example.com/hook")
    );
    assert_eq!(
        config.integrations.public_base_url,
        defaults.integrations.public_base_url
    );
}

#[test]
#[serial]
fn load_applies_environment_overrides() {
    let (temp_dir, mut ctx) = isolated();

    write_config_file(
        temp_dir.path(),
        "smileboard.toml",
        r#"
        [http]
        port = 3030
        "#,
    );

    ctx.set_var("SMILEBOARD__HTTP__PORT", "8080");
    ctx.set_var("SMILEBOARD__AUTH__GOOGLE__TOKEN_URL", "http://127.0.0.1:9999/token");

    let config = load().expect("configuration load should honour env overrides");
    assert_eq!(config.http.port, 8080);
    assert_eq!(config.auth.google.token_url, "http://127.0.0.1:9999/token");
}

#[test]
#[serial]
fn load_splits_allowed_origins_from_environment() {
    let (_temp_dir, mut ctx) = isolated();

    ctx.set_var(
        "SMILEBOARD__INTEGRATIONS__ALLOWED_ORIGINS",
        "https://app.smileboard.io,https://staging.smileboard.io",
    );

    let config = load().expect("configuration load should parse origin list");
    assert_eq!(
        config.integrations.allowed_origins,
        vec![
            "https://app.smileboard.io".to_string(),
            "https://staging.smileboard.io".to_string()
        ]
    );
}

#[test]
#[serial]
fn load_reads_explicit_config_path() {
    let (temp_dir, mut ctx) = isolated();

    write_config_file(
        temp_dir.path(),
        "elsewhere/custom.toml",
        r#"
        [http]
        address = "0.0.0.0"
        "#,
    );
    let path = temp_dir.path().join("elsewhere/custom.toml");
    ctx.set_var("SMILEBOARD_CONFIG", path.display().to_string());

    let config = load().expect("configuration load should use SMILEBOARD_CONFIG");
    assert_eq!(config.http.address, "0.0.0.0");
}

#[test]
#[serial]
fn load_clamps_session_ttl_to_i64_maximum() {
    let (_temp_dir, mut ctx) = isolated();

    let oversized = (i64::MAX as u128 + 42).to_string();
    ctx.set_var("SMILEBOARD__AUTH__SESSION_TTL_SECONDS", &oversized);

    let config = load().expect("configuration load should succeed with oversized TTL");
    assert_eq!(
        config.auth.session_ttl_seconds,
        i64::MAX as u64,
        "session TTL should be clamped to i64::MAX"
    );
}

#[test]
#[serial]
fn load_errors_on_invalid_toml_contents() {
    let (temp_dir, _ctx) = isolated();

    write_config_file(
        temp_dir.path(),
        "smileboard.toml",
        r#"
        [http]
        port = "not-a-number
        "#,
    );

    let error = load().expect_err("invalid TOML should cause load to fail");
    let message = error.to_string();
    assert!(
        message.contains("invalid configuration") || message.contains("unable to build configuration"),
        "unexpected error message: {message}"
    );
}

#[test]
fn auth_config_defaults_leave_google_unconfigured() {
    let defaults = AuthConfig::default();
    assert_eq!(defaults.session_ttl_seconds, 86_400);
    assert!(defaults.google.client_id.is_none());
    assert!(defaults.google.client_secret.is_none());
    assert!(defaults.google.redirect_uri.ends_with("/api/integrations/google/callback"));
}

#[test]
fn integrations_config_defaults_allow_local_dev_origins() {
    let defaults = IntegrationsConfig::default();
    assert!(defaults
        .allowed_origins
        .contains(&"http://localhost:5173".to_string()));
    assert!(defaults.sync_webhook_url.is_none());
}

#[test]
fn http_config_defaults_match_expected_host_and_port() {
    let defaults = HttpConfig::default();
    assert_eq!(defaults.address, "127.0.0.1");
    assert_eq!(defaults.port, 7070);
}
