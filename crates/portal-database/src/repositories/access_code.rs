//! Access code repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use portal_core::error::{AppError, ErrorKind};
use portal_core::result::AppResult;
use portal_entity::access_code::{AccessCode, CreateAccessCode};

/// Repository for access code issue, lookup and redemption.
#[derive(Debug, Clone)]
pub struct AccessCodeRepository {
    pool: PgPool,
}

impl AccessCodeRepository {
    /// Create a new access code repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a code by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<AccessCode>> {
        sqlx::query_as::<_, AccessCode>("SELECT * FROM access_codes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::StorageFailure, "Failed to find access code", e)
            })
    }

    /// Find an active code by its secret.
    pub async fn find_active_by_code(&self, code: &str) -> AppResult<Option<AccessCode>> {
        sqlx::query_as::<_, AccessCode>(
            "SELECT * FROM access_codes WHERE code = $1 AND is_active = TRUE",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::StorageFailure, "Failed to find access code", e)
        })
    }

    /// List all codes, newest first.
    pub async fn find_all(&self) -> AppResult<Vec<AccessCode>> {
        sqlx::query_as::<_, AccessCode>("SELECT * FROM access_codes ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::StorageFailure, "Failed to list access codes", e)
            })
    }

    /// Issue a new code.
    pub async fn create(&self, data: &CreateAccessCode) -> AppResult<AccessCode> {
        sqlx::query_as::<_, AccessCode>(
            "INSERT INTO access_codes (code, max_uses, upload_quota, expiry_date, created_by) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(&data.code)
        .bind(data.max_uses)
        .bind(data.upload_quota)
        .bind(data.expiry_date)
        .bind(data.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::StorageFailure, "Failed to create access code", e)
        })
    }

    /// Revoke a code.
    pub async fn deactivate(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("UPDATE access_codes SET is_active = FALSE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::StorageFailure, "Failed to revoke access code", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    /// Consume one use in a single conditional update.
    pub async fn redeem(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<Option<AccessCode>> {
        sqlx::query_as::<_, AccessCode>(
            "UPDATE access_codes SET current_uses = current_uses + 1 \
             WHERE id = $1 AND is_active = TRUE AND current_uses < max_uses \
             AND (expiry_date IS NULL OR expiry_date >= $2) RETURNING *",
        )
        .bind(id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::StorageFailure, "Failed to redeem access code", e)
        })
    }

    /// Deactivate every code that expired before `now`.
    pub async fn deactivate_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE access_codes SET is_active = FALSE \
             WHERE is_active = TRUE AND expiry_date IS NOT NULL AND expiry_date < $1",
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::StorageFailure,
                "Failed to deactivate expired access codes",
                e,
            )
        })?;
        Ok(result.rows_affected())
    }
}
