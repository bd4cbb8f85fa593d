//! Share access control: validates share tokens and counts downloads.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use portal_auth::password::PasswordHasher;
use portal_core::error::AppError;
use portal_core::result::AppResult;
use portal_database::store::{FileCatalog, ShareStore};
use portal_entity::file::FileRecord;
use portal_entity::share::ShareToken;

/// A share that passed validation together with its file.
#[derive(Debug, Clone)]
pub struct SharedDownload {
    /// The share, with `download_count` reflecting this download once
    /// counted.
    pub share: ShareToken,
    /// The shared file.
    pub file: FileRecord,
}

/// Handles anonymous share access.
#[derive(Debug, Clone)]
pub struct AccessService {
    /// Share tokens.
    shares: Arc<dyn ShareStore>,
    /// File metadata.
    files: Arc<dyn FileCatalog>,
    /// Password hasher for protected shares.
    hasher: Arc<PasswordHasher>,
}

impl AccessService {
    /// Creates a new access service.
    pub fn new(
        shares: Arc<dyn ShareStore>,
        files: Arc<dyn FileCatalog>,
        hasher: Arc<PasswordHasher>,
    ) -> Self {
        Self {
            shares,
            files,
            hasher,
        }
    }

    /// Check a token without counting a download.
    ///
    /// Checks run in a fixed order and the first failure wins: unknown
    /// token or missing file, deactivated, expired, download limit, then
    /// the password. An empty password counts as none.
    pub async fn validate(&self, token: &str, password: Option<&str>) -> AppResult<SharedDownload> {
        let share = self
            .shares
            .find_by_token(token)
            .await?
            .ok_or_else(|| AppError::not_found("Invalid share link"))?;

        let file = self
            .files
            .find_by_id(share.file_id)
            .await?
            .ok_or_else(|| AppError::not_found("Shared file no longer exists"))?;

        Self::check_state(&share)?;

        if share.is_password_protected() {
            let supplied = password.filter(|p| !p.is_empty()).ok_or_else(|| {
                AppError::password_required(format!("Share {} needs a password", share.id))
            })?;
            let hash = share.password_hash.as_deref().unwrap_or_default();
            if !self.hasher.verify_password(supplied, hash)? {
                debug!(share_id = %share.id, "Wrong share password");
                return Err(AppError::invalid_password(format!(
                    "Wrong password for share {}",
                    share.id
                )));
            }
        }

        Ok(SharedDownload { share, file })
    }

    /// Count one download against a share.
    ///
    /// The increment is conditional in the store, so concurrent callers can
    /// never push the count past `max_downloads`.
    pub async fn record_download(&self, share_id: Uuid) -> AppResult<i32> {
        if let Some(count) = self.shares.try_increment_download(share_id).await? {
            return Ok(count);
        }
        let share = self
            .shares
            .find_by_id(share_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Share {share_id} not found")))?;
        if !share.is_active {
            return Err(AppError::deactivated(format!("Share {share_id} is deactivated")));
        }
        Err(AppError::download_limit_reached(format!(
            "Share {share_id} reached {} downloads",
            share.download_count
        )))
    }

    /// Validate then count, the full anonymous download gate.
    pub async fn redeem(&self, token: &str, password: Option<&str>) -> AppResult<SharedDownload> {
        let mut download = self.validate(token, password).await?;
        let count = self.record_download(download.share.id).await?;
        download.share.download_count = count;
        info!(
            share_id = %download.share.id,
            file_id = %download.file.id,
            download_count = count,
            "Shared file downloaded"
        );
        Ok(download)
    }

    /// Shares shown in the anonymous public listing.
    pub async fn list_public(&self) -> AppResult<Vec<ShareToken>> {
        self.shares.list_public(Utc::now()).await
    }

    fn check_state(share: &ShareToken) -> AppResult<()> {
        if !share.is_active {
            return Err(AppError::deactivated(format!("Share {} is deactivated", share.id)));
        }
        if share.is_expired_at(Utc::now()) {
            return Err(AppError::already_expired(format!("Share {} has expired", share.id)));
        }
        if share.limit_reached() {
            return Err(AppError::download_limit_reached(format!(
                "Share {} reached its download limit",
                share.id
            )));
        }
        Ok(())
    }
}
