//! Share repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use portal_core::error::{AppError, ErrorKind};
use portal_core::result::AppResult;
use portal_entity::share::{NewShareToken, ShareToken};

use crate::store::ShareStore;

/// Repository for the `shared_files` table.
#[derive(Debug, Clone)]
pub struct ShareRepository {
    pool: PgPool,
}

impl ShareRepository {
    /// Create a new share repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn list(&self, sql: &str, bind: Option<Uuid>, what: &str) -> AppResult<Vec<ShareToken>> {
        let mut query = sqlx::query_as::<_, ShareToken>(sql);
        if let Some(id) = bind {
            query = query.bind(id);
        }
        query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::StorageFailure, what.to_string(), e))
    }
}

#[async_trait]
impl ShareStore for ShareRepository {
    async fn create(&self, data: &NewShareToken) -> AppResult<ShareToken> {
        sqlx::query_as::<_, ShareToken>(
            "INSERT INTO shared_files (file_id, share_token, shared_by_user, is_public, \
             password_hash, expires_at, max_downloads) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(data.file_id)
        .bind(&data.token)
        .bind(data.owner_user_id)
        .bind(data.is_public)
        .bind(&data.password_hash)
        .bind(data.expires_at)
        .bind(data.max_downloads)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::StorageFailure, "Failed to create share", e))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ShareToken>> {
        sqlx::query_as::<_, ShareToken>("SELECT * FROM shared_files WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::StorageFailure, "Failed to find share", e)
            })
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<ShareToken>> {
        sqlx::query_as::<_, ShareToken>("SELECT * FROM shared_files WHERE share_token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::StorageFailure, "Failed to find share by token", e)
            })
    }

    async fn update(&self, share: &ShareToken) -> AppResult<Option<ShareToken>> {
        sqlx::query_as::<_, ShareToken>(
            "UPDATE shared_files SET is_public = $1, password_hash = $2, expires_at = $3, \
             max_downloads = $4, is_active = $5 WHERE id = $6 RETURNING *",
        )
        .bind(share.is_public)
        .bind(&share.password_hash)
        .bind(share.expires_at)
        .bind(share.max_downloads)
        .bind(share.is_active)
        .bind(share.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            let kind = match e.as_database_error().map(|db| db.kind()) {
                Some(sqlx::error::ErrorKind::CheckViolation) => ErrorKind::Validation,
                _ => ErrorKind::StorageFailure,
            };
            AppError::with_source(kind, "Failed to update share", e)
        })
    }

    async fn try_increment_download(&self, id: Uuid) -> AppResult<Option<i32>> {
        sqlx::query_scalar::<_, i32>(
            "UPDATE shared_files SET download_count = download_count + 1 \
             WHERE id = $1 AND is_active = TRUE \
             AND (max_downloads IS NULL OR download_count < max_downloads) \
             RETURNING download_count",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::StorageFailure, "Failed to increment downloads", e)
        })
    }

    async fn deactivate(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("UPDATE shared_files SET is_active = FALSE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::StorageFailure, "Failed to deactivate share", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM shared_files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::StorageFailure, "Failed to delete share", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_file(&self, file_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM shared_files WHERE file_id = $1")
            .bind(file_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::StorageFailure, "Failed to delete file shares", e)
            })?;
        Ok(result.rows_affected())
    }

    async fn list_by_owner(&self, user_id: Uuid) -> AppResult<Vec<ShareToken>> {
        self.list(
            "SELECT * FROM shared_files WHERE shared_by_user = $1 ORDER BY created_at DESC",
            Some(user_id),
            "Failed to list shares by owner",
        )
        .await
    }

    async fn list_by_file(&self, file_id: Uuid) -> AppResult<Vec<ShareToken>> {
        self.list(
            "SELECT * FROM shared_files WHERE file_id = $1 ORDER BY created_at DESC",
            Some(file_id),
            "Failed to list shares by file",
        )
        .await
    }

    async fn list_public(&self, now: DateTime<Utc>) -> AppResult<Vec<ShareToken>> {
        sqlx::query_as::<_, ShareToken>(
            "SELECT * FROM shared_files \
             WHERE is_public = TRUE AND is_active = TRUE \
             AND (password_hash IS NULL OR password_hash = '') \
             AND (expires_at IS NULL OR expires_at >= $1) \
             AND (max_downloads IS NULL OR download_count < max_downloads) \
             ORDER BY created_at DESC",
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::StorageFailure, "Failed to list public shares", e)
        })
    }

    async fn list_all(&self) -> AppResult<Vec<ShareToken>> {
        self.list(
            "SELECT * FROM shared_files ORDER BY created_at DESC",
            None,
            "Failed to list shares",
        )
        .await
    }
}
