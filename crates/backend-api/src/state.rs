use std::{collections::HashMap, sync::Arc, time::Duration as StdDuration, time::Instant};

use rand::{distributions::Alphanumeric, Rng};
use smileboard_auth::{AuthSession, Authenticator};
use smileboard_config::IntegrationsConfig;
use smileboard_database::{IntegrationProvider, User};
use sqlx::SqlitePool;
use tokio::sync::Mutex;

use crate::ApiError;

const DEFAULT_OAUTH_STATE_TTL: StdDuration = StdDuration::from_secs(600);

#[derive(Clone)]
pub struct AppState {
    db_pool: SqlitePool,
    authenticator: Authenticator,
    oauth_state: OAuthStateStore,
    integrations: Arc<IntegrationsConfig>,
    http: reqwest::Client,
}

impl AppState {
    pub fn new(
        db_pool: SqlitePool,
        authenticator: Authenticator,
        integrations: IntegrationsConfig,
    ) -> Self {
        Self::with_oauth_store(
            db_pool,
            authenticator,
            integrations,
            OAuthStateStore::default(),
        )
    }

    pub fn with_oauth_store(
        db_pool: SqlitePool,
        authenticator: Authenticator,
        integrations: IntegrationsConfig,
        oauth_state: OAuthStateStore,
    ) -> Self {
        Self {
            db_pool,
            authenticator,
            oauth_state,
            integrations: Arc::new(integrations),
            http: reqwest::Client::new(),
        }
    }

    pub fn db_pool(&self) -> &SqlitePool {
        &self.db_pool
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    pub fn oauth_state(&self) -> &OAuthStateStore {
        &self.oauth_state
    }

    pub fn integrations(&self) -> &IntegrationsConfig {
        &self.integrations
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub async fn authenticate(&self, token: &str) -> Result<(User, AuthSession), ApiError> {
        self.authenticator
            .authenticate_token(token)
            .await
            .map_err(ApiError::from)
    }
}

/// Who started an OAuth round trip and for which integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingAuthorization {
    pub user_id: i64,
    pub provider: IntegrationProvider,
}

#[derive(Debug, Clone, Copy)]
struct PendingEntry {
    authorization: PendingAuthorization,
    created: Instant,
}

/// Single-use OAuth `state` values, each bound to the user that requested
/// the consent URL.
#[derive(Clone)]
pub struct OAuthStateStore {
    inner: Arc<Mutex<HashMap<String, PendingEntry>>>,
    ttl: StdDuration,
}

impl OAuthStateStore {
    pub fn new(ttl: StdDuration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    pub async fn issue(&self, authorization: PendingAuthorization) -> String {
        let state = Self::random_state();
        self.store(state.clone(), authorization).await;
        state
    }

    pub async fn store(&self, state: String, authorization: PendingAuthorization) {
        let mut guard = self.inner.lock().await;
        Self::prune(&mut guard, self.ttl);
        guard.insert(
            state,
            PendingEntry {
                authorization,
                created: Instant::now(),
            },
        );
    }

    pub async fn consume(&self, state: &str) -> Option<PendingAuthorization> {
        let mut guard = self.inner.lock().await;
        Self::prune(&mut guard, self.ttl);
        guard.remove(state).map(|entry| entry.authorization)
    }

    pub async fn pending_count(&self) -> usize {
        let mut guard = self.inner.lock().await;
        Self::prune(&mut guard, self.ttl);
        guard.len()
    }

    fn random_state() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect()
    }

    fn prune(map: &mut HashMap<String, PendingEntry>, ttl: StdDuration) {
        let now = Instant::now();
        map.retain(|_, entry| now.duration_since(entry.created) <= ttl);
    }
}

impl Default for OAuthStateStore {
    fn default() -> Self {
        Self::new(DEFAULT_OAUTH_STATE_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{sleep, Duration};

    const PENDING: PendingAuthorization = PendingAuthorization {
        user_id: 7,
        provider: IntegrationProvider::GoogleCalendar,
    };

    #[tokio::test]
    async fn oauth_state_issue_and_consume_once() {
        let store = OAuthStateStore::new(Duration::from_secs(60));
        let state = store.issue(PENDING).await;

        assert_eq!(state.len(), 32);
        assert_eq!(store.consume(&state).await, Some(PENDING));
        assert_eq!(store.consume(&state).await, None);
    }

    #[tokio::test]
    async fn oauth_state_entry_expires_after_ttl() {
        let store = OAuthStateStore::new(Duration::from_millis(10));
        let state = "expired-state".to_string();
        store.store(state.clone(), PENDING).await;

        sleep(Duration::from_millis(25)).await;

        assert_eq!(store.consume(&state).await, None);
        assert_eq!(store.pending_count().await, 0);
    }
}
