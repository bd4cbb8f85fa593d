//! Quota repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use portal_core::error::{AppError, ErrorKind};
use portal_core::result::AppResult;
use portal_entity::quota::{QuotaOwner, QuotaUsage};

use crate::store::QuotaStore;

/// Quota counters stored on `users` and `access_codes`.
#[derive(Debug, Clone)]
pub struct QuotaRepository {
    pool: PgPool,
}

impl QuotaRepository {
    /// Create a new quota repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn table_of(owner: QuotaOwner) -> (&'static str, uuid::Uuid) {
    match owner {
        QuotaOwner::User(id) => ("users", id),
        QuotaOwner::AccessCode(id) => ("access_codes", id),
    }
}

#[async_trait]
impl QuotaStore for QuotaRepository {
    async fn usage(&self, owner: QuotaOwner) -> AppResult<Option<QuotaUsage>> {
        let (table, id) = table_of(owner);
        let row: Option<(i64, i64)> = sqlx::query_as(&format!(
            "SELECT upload_quota, used_quota FROM {table} WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::StorageFailure, "Failed to read quota", e))?;
        Ok(row.map(|(total, used)| QuotaUsage::new(total, used)))
    }

    async fn try_charge(&self, owner: QuotaOwner, bytes: i64) -> AppResult<Option<QuotaUsage>> {
        let (table, id) = table_of(owner);
        let row: Option<(i64, i64)> = sqlx::query_as(&format!(
            "UPDATE {table} SET used_quota = used_quota + $2 \
             WHERE id = $1 AND used_quota + $2 <= upload_quota \
             RETURNING upload_quota, used_quota"
        ))
        .bind(id)
        .bind(bytes)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::StorageFailure, "Failed to charge quota", e))?;
        Ok(row.map(|(total, used)| QuotaUsage::new(total, used)))
    }

    async fn release(&self, owner: QuotaOwner, bytes: i64) -> AppResult<()> {
        let (table, id) = table_of(owner);
        sqlx::query(&format!(
            "UPDATE {table} SET used_quota = GREATEST(0, used_quota - $2) WHERE id = $1"
        ))
        .bind(id)
        .bind(bytes)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::StorageFailure, "Failed to release quota", e)
        })?;
        Ok(())
    }
}
