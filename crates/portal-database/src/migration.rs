//! Database migration runner.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;

use portal_core::error::{AppError, ErrorKind};

/// One applied migration as recorded by sqlx.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AppliedMigration {
    /// Migration version (the numeric file prefix).
    pub version: i64,
    /// Migration description.
    pub description: String,
    /// When the migration ran.
    pub installed_on: DateTime<Utc>,
    /// Whether it completed.
    pub success: bool,
}

/// Run all pending database migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    info!("Running database migrations...");

    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::StorageFailure,
                format!("Failed to run migrations: {e}"),
                e,
            )
        })?;

    info!("Database migrations completed successfully");
    Ok(())
}

/// List migrations already applied to the database.
pub async fn applied_migrations(pool: &PgPool) -> Result<Vec<AppliedMigration>, AppError> {
    sqlx::query_as::<_, AppliedMigration>(
        "SELECT version, description, installed_on, success FROM _sqlx_migrations ORDER BY version",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| {
        AppError::with_source(
            ErrorKind::StorageFailure,
            "Failed to read migration history (has `migrate run` been executed?)",
            e,
        )
    })
}
