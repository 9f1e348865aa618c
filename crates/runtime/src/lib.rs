use anyhow::{Context, Result};
use smileboard_api::AppState;
use smileboard_auth::Authenticator;
use smileboard_config::AppConfig;
use smileboard_database::initialize_database;
use sqlx::SqlitePool;
use tracing::{info, warn};

pub mod telemetry {
    use anyhow::Result;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    /// Install the global fmt subscriber; `RUST_LOG` overrides the default
    /// `info` filter.
    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_env_filter(env_filter)
            .with_target(true)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

#[derive(Clone)]
pub struct BackendServices {
    pub db_pool: SqlitePool,
    pub authenticator: Authenticator,
}

impl BackendServices {
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        let db_pool = initialize_database(&config.database)
            .await
            .context("failed to initialise database")?;

        let authenticator = Authenticator::new(db_pool.clone(), &config.auth)
            .context("failed to configure authenticator")?;

        if authenticator.google_enabled() {
            info!("google oauth configured");
        } else {
            warn!("google oauth credentials missing; integrations are disabled");
        }

        Ok(Self {
            db_pool,
            authenticator,
        })
    }

    /// Shared HTTP state for the API router.
    pub fn app_state(&self, config: &AppConfig) -> AppState {
        AppState::new(
            self.db_pool.clone(),
            self.authenticator.clone(),
            config.integrations.clone(),
        )
    }
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
