//! File metadata lookup.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use portal_core::result::AppResult;
use portal_entity::file::{CreateFileRecord, FileRecord};
use portal_entity::principal::ResourceOwner;

/// File metadata catalog.
#[async_trait]
pub trait FileCatalog: Send + Sync + std::fmt::Debug {
    /// Find a file by id.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<FileRecord>>;

    /// Insert a new file record.
    async fn insert(&self, data: &CreateFileRecord) -> AppResult<FileRecord>;

    /// Delete a file record. Returns whether a row was removed.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    /// Files uploaded by `owner`, newest first.
    async fn list_by_owner(&self, owner: &ResourceOwner) -> AppResult<Vec<FileRecord>>;

    /// Every file, newest first.
    async fn list_all(&self) -> AppResult<Vec<FileRecord>>;

    /// Set or clear the expiry date. Returns the updated row, or `None`
    /// when the file does not exist.
    async fn update_expiry(
        &self,
        id: Uuid,
        expiry_date: Option<DateTime<Utc>>,
    ) -> AppResult<Option<FileRecord>>;
}
