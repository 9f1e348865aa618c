//! Smileboard Database Crate
//!
//! Connection management, migrations, entities and repositories for the
//! clinic dashboard: users, contacts, campaigns, reviews, Google connections
//! and billing logs.

use sqlx::SqlitePool;
use smileboard_config::DatabaseConfig;

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod types;

pub use connection::prepare_database;
pub use migrations::{run_migrations, MIGRATOR};

pub use repos::{
    BillingRepository, CampaignRepository, ConnectionRepository, ContactRepository,
    ReviewRepository, UserRepository,
};

pub use entities::{
    BillingLog, BillingStatus, Campaign, CampaignChannel, CampaignReviewSummary, Connection,
    ConnectionStatus, Contact, ContactFilter, ContactOrigin, CreateBillingLogRequest,
    CreateCampaignRequest, CreateContactRequest, CreateReviewRequest, Feature,
    IntegrationProvider, Plan, Review, TokenSet, UpdateCampaignRequest, UpdateContactRequest,
    UpdateUserRequest, UpsertOutcome, User,
};

pub use types::{DatabaseError, DatabaseResult};

/// Connect and bring the schema up to date.
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(format!("{e:#}")))?;

    Ok(pool)
}

pub(crate) fn new_public_id() -> String {
    cuid2::create_id()
}

pub(crate) fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
