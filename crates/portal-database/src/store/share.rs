//! Share token persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use portal_core::result::AppResult;
use portal_entity::share::{NewShareToken, ShareToken};

/// Share token persistence.
#[async_trait]
pub trait ShareStore: Send + Sync + std::fmt::Debug {
    /// Persist a new share.
    async fn create(&self, data: &NewShareToken) -> AppResult<ShareToken>;

    /// Find a share by id.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ShareToken>>;

    /// Find a share by token, including inactive ones.
    async fn find_by_token(&self, token: &str) -> AppResult<Option<ShareToken>>;

    /// Write the mutable fields (`is_public`, `password_hash`, `expires_at`,
    /// `max_downloads`, `is_active`) of an existing share.
    ///
    /// A `max_downloads` below the stored `download_count` is refused with
    /// a validation error.
    async fn update(&self, share: &ShareToken) -> AppResult<Option<ShareToken>>;

    /// Count one download.
    ///
    /// Increments `download_count` only if the share is active and below
    /// `max_downloads`; returns the new count, or `None` when refused or
    /// missing.
    async fn try_increment_download(&self, id: Uuid) -> AppResult<Option<i32>>;

    /// Clear `is_active`. Returns whether a row matched.
    async fn deactivate(&self, id: Uuid) -> AppResult<bool>;

    /// Delete a share. Returns whether a row was removed.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    /// Delete every share of a file.
    async fn delete_by_file(&self, file_id: Uuid) -> AppResult<u64>;

    /// Shares created by an account, newest first.
    async fn list_by_owner(&self, user_id: Uuid) -> AppResult<Vec<ShareToken>>;

    /// Shares of a file, newest first.
    async fn list_by_file(&self, file_id: Uuid) -> AppResult<Vec<ShareToken>>;

    /// Public, active, unprotected, unexpired, under-limit shares at `now`.
    async fn list_public(&self, now: DateTime<Utc>) -> AppResult<Vec<ShareToken>>;

    /// Every share, newest first.
    async fn list_all(&self) -> AppResult<Vec<ShareToken>>;
}
