//! Login attempt repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use portal_core::error::{AppError, ErrorKind};
use portal_core::result::AppResult;
use portal_entity::attempt::LoginAttempt;

use crate::store::LoginAttemptStore;

/// Repository for the `login_attempts` table.
#[derive(Debug, Clone)]
pub struct LoginAttemptRepository {
    pool: PgPool,
}

impl LoginAttemptRepository {
    /// Create a new login attempt repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoginAttemptStore for LoginAttemptRepository {
    async fn append(&self, attempt: &LoginAttempt) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO login_attempts (identifier, attempt_time, was_successful) \
             VALUES ($1, $2, $3)",
        )
        .bind(&attempt.identifier)
        .bind(attempt.attempt_time)
        .bind(attempt.was_successful)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::StorageFailure, "Failed to record login attempt", e)
        })?;
        Ok(())
    }

    async fn count_failed_since(&self, identifier: &str, since: DateTime<Utc>) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM login_attempts \
             WHERE identifier = $1 AND was_successful = FALSE AND attempt_time > $2",
        )
        .bind(identifier)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::StorageFailure, "Failed to count login attempts", e)
        })?;
        Ok(count.max(0) as u64)
    }

    async fn clear_failed(&self, identifier: &str) -> AppResult<u64> {
        let result = sqlx::query(
            "DELETE FROM login_attempts WHERE identifier = $1 AND was_successful = FALSE",
        )
        .bind(identifier)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::StorageFailure, "Failed to clear login attempts", e)
        })?;
        Ok(result.rows_affected())
    }

    async fn prune_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM login_attempts WHERE attempt_time < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::StorageFailure, "Failed to prune login attempts", e)
            })?;
        Ok(result.rows_affected())
    }
}
