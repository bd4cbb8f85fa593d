//! File repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use portal_core::error::{AppError, ErrorKind};
use portal_core::result::AppResult;
use portal_entity::file::{CreateFileRecord, FileRecord};
use portal_entity::principal::ResourceOwner;

use crate::store::FileCatalog;

/// Repository for file metadata.
#[derive(Debug, Clone)]
pub struct FileRepository {
    pool: PgPool,
}

impl FileRepository {
    /// Create a new file repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileCatalog for FileRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<FileRecord>> {
        sqlx::query_as::<_, FileRecord>("SELECT * FROM files WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::StorageFailure, "Failed to find file", e))
    }

    async fn insert(&self, data: &CreateFileRecord) -> AppResult<FileRecord> {
        sqlx::query_as::<_, FileRecord>(
            "INSERT INTO files (original_filename, stored_path, size_bytes, file_hash, mime_type, \
             owner_user_id, owner_code_id) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(&data.original_filename)
        .bind(&data.stored_path)
        .bind(data.size_bytes)
        .bind(&data.file_hash)
        .bind(&data.mime_type)
        .bind(data.owner.user)
        .bind(data.owner.code)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::StorageFailure, "Failed to create file", e))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::StorageFailure, "Failed to delete file", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_by_owner(&self, owner: &ResourceOwner) -> AppResult<Vec<FileRecord>> {
        let (sql, id) = match (owner.user, owner.code) {
            (Some(user), _) => (
                "SELECT * FROM files WHERE owner_user_id = $1 ORDER BY uploaded_at DESC",
                user,
            ),
            (None, Some(code)) => (
                "SELECT * FROM files WHERE owner_code_id = $1 ORDER BY uploaded_at DESC",
                code,
            ),
            (None, None) => return Ok(Vec::new()),
        };
        sqlx::query_as::<_, FileRecord>(sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::StorageFailure, "Failed to list files by owner", e)
            })
    }

    async fn list_all(&self) -> AppResult<Vec<FileRecord>> {
        sqlx::query_as::<_, FileRecord>("SELECT * FROM files ORDER BY uploaded_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::StorageFailure, "Failed to list files", e))
    }

    async fn update_expiry(
        &self,
        id: Uuid,
        expiry_date: Option<DateTime<Utc>>,
    ) -> AppResult<Option<FileRecord>> {
        sqlx::query_as::<_, FileRecord>(
            "UPDATE files SET expiry_date = $1 WHERE id = $2 RETURNING *",
        )
        .bind(expiry_date)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::StorageFailure, "Failed to update file expiry", e)
        })
    }
}
