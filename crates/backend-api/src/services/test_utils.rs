//! Test utilities for service layer testing

use chrono::{DateTime, Utc};
use smileboard_database::{Plan, User, UserRepository, MIGRATOR};
use sqlx::{sqlite::SqliteConnectOptions, SqlitePool};
use tempfile::TempDir;

/// Creates a migrated test database in a temporary directory.
pub async fn create_test_db() -> (SqlitePool, TempDir) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");

    let connect_options = SqliteConnectOptions::new()
        .filename(&db_path)
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePool::connect_with(connect_options)
        .await
        .expect("Failed to create test database");

    MIGRATOR.run(&pool).await.expect("Failed to migrate schema");

    (pool, temp_dir)
}

/// Inserts a clinic owner on the given plan.
pub async fn create_test_user(
    pool: &SqlitePool,
    public_id: &str,
    plan: Plan,
    plan_expires_at: Option<DateTime<Utc>>,
) -> User {
    let now = Utc::now().to_rfc3339();
    let result = sqlx::query(
        r#"
        INSERT INTO users (public_id, email, display_name, clinic_name, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(public_id)
    .bind(format!("{public_id}@example.com"))
    .bind(format!("Dr. {public_id}"))
    .bind("Bright Smiles")
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await
    .expect("Failed to insert user");

    UserRepository::new(pool.clone())
        .set_plan(result.last_insert_rowid(), plan, plan_expires_at)
        .await
        .expect("Failed to set plan")
}
