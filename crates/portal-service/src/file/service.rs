//! File upload, listing, download and removal.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::{error, info, warn};
use uuid::Uuid;

use portal_auth::rbac::{Permission, RbacEngine};
use portal_core::config::UploadConfig;
use portal_core::error::AppError;
use portal_core::result::AppResult;
use portal_database::store::FileCatalog;
use portal_entity::file::{CreateFileRecord, FileRecord};
use portal_entity::quota::QuotaOwner;

use super::storage::BlobStorage;
use super::upload::{self, UploadRequest};
use crate::context::RequestContext;
use crate::quota::QuotaLedger;
use crate::share::{ShareService, SharedDownload};

/// Uploads, reads and removes files on behalf of principals.
#[derive(Debug, Clone)]
pub struct FileService {
    /// File metadata.
    files: Arc<dyn FileCatalog>,
    /// File content.
    blobs: Arc<dyn BlobStorage>,
    /// Quota accounting.
    ledger: QuotaLedger,
    /// Share cleanup and anonymous downloads.
    shares: Arc<ShareService>,
    /// Permission checks.
    rbac: Arc<RbacEngine>,
    /// Size limits.
    config: UploadConfig,
}

fn quota_owner_of(file: &FileRecord) -> Option<QuotaOwner> {
    match (file.owner_user_id, file.owner_code_id) {
        (Some(user), _) => Some(QuotaOwner::User(user)),
        (None, Some(code)) => Some(QuotaOwner::AccessCode(code)),
        (None, None) => None,
    }
}

impl FileService {
    /// Creates a new file service.
    pub fn new(
        files: Arc<dyn FileCatalog>,
        blobs: Arc<dyn BlobStorage>,
        ledger: QuotaLedger,
        shares: Arc<ShareService>,
        rbac: Arc<RbacEngine>,
        config: UploadConfig,
    ) -> Self {
        Self {
            files,
            blobs,
            ledger,
            shares,
            rbac,
            config,
        }
    }

    /// Store a file for the calling principal and charge its quota.
    ///
    /// Once bytes are written, any later failure removes them again and
    /// releases the charge.
    pub async fn upload(&self, ctx: &RequestContext, req: UploadRequest) -> AppResult<FileRecord> {
        let principal = ctx.require_principal()?;
        self.rbac
            .require(ctx.principal(), Permission::FilesUpload, None)?;

        let size = req.size_bytes();
        if size == 0 {
            return Err(AppError::validation("Uploaded file is empty"));
        }
        if size > self.config.max_file_size_bytes {
            return Err(AppError::validation(format!(
                "File exceeds maximum upload size of {} bytes",
                self.config.max_file_size_bytes
            )));
        }

        let owner = QuotaOwner::from(principal);
        if !self.ledger.can_accept(owner, size).await? {
            return Err(AppError::quota_exceeded(format!(
                "{} cannot accept {size} more bytes",
                principal.label
            )));
        }

        let stored_path = upload::stored_name(&req.file_name, Utc::now());
        let file_hash = upload::content_hash(&req.data);
        self.blobs.write(&stored_path, req.data).await?;

        let charge = match self.ledger.reserve(owner, size).await {
            Ok(charge) => charge,
            Err(e) => {
                self.discard_blob(&stored_path).await;
                return Err(e);
            }
        };

        let record = self
            .files
            .insert(&CreateFileRecord {
                original_filename: req.file_name,
                stored_path: stored_path.clone(),
                size_bytes: size,
                file_hash,
                mime_type: req.mime_type,
                owner: principal.as_owner(),
            })
            .await;

        match record {
            Ok(file) => {
                charge.commit();
                info!(
                    principal = %principal.label,
                    file_id = %file.id,
                    size = size,
                    "File uploaded"
                );
                Ok(file)
            }
            Err(e) => {
                self.discard_blob(&stored_path).await;
                if let Err(release_err) = charge.rollback().await {
                    error!(
                        owner = ?owner,
                        bytes = size,
                        error = %release_err,
                        "Failed to release quota after metadata failure"
                    );
                }
                Err(e)
            }
        }
    }

    /// Gets a file the caller may view.
    pub async fn get(&self, ctx: &RequestContext, file_id: Uuid) -> AppResult<FileRecord> {
        let file = self.find(file_id).await?;
        self.rbac
            .require(ctx.principal(), Permission::FilesViewOwn, Some(&file.owner()))?;
        Ok(file)
    }

    /// Files visible to the caller, newest first.
    ///
    /// Roles holding `files.view.all` see every file; everyone else sees
    /// what they uploaded themselves.
    pub async fn list(&self, ctx: &RequestContext) -> AppResult<Vec<FileRecord>> {
        let principal = ctx.require_principal()?;
        if self
            .rbac
            .has_permission(principal.role, Permission::FilesViewAll)
        {
            return self.files.list_all().await;
        }
        self.rbac
            .require(ctx.principal(), Permission::FilesViewOwn, None)?;
        self.files.list_by_owner(&principal.as_owner()).await
    }

    /// Read a file the caller may view.
    pub async fn download(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
    ) -> AppResult<(FileRecord, Bytes)> {
        let file = self.get(ctx, file_id).await?;
        let data = self.blobs.read(&file.stored_path).await?;
        info!(file_id = %file_id, size = file.size_bytes, "File downloaded");
        Ok((file, data))
    }

    /// Set or clear a file's expiry date.
    ///
    /// Governed by the delete permission, since the date schedules removal.
    pub async fn update_expiry(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        expiry_date: Option<DateTime<Utc>>,
    ) -> AppResult<FileRecord> {
        let file = self.find(file_id).await?;
        self.rbac
            .require(ctx.principal(), Permission::FilesDeleteOwn, Some(&file.owner()))?;

        let updated = self
            .files
            .update_expiry(file_id, expiry_date)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))?;
        info!(file_id = %file_id, expiry_date = ?expiry_date, "File expiry updated");
        Ok(updated)
    }

    /// Remove a file, its shares and its bytes, and return its quota.
    pub async fn delete(&self, ctx: &RequestContext, file_id: Uuid) -> AppResult<()> {
        let file = self.find(file_id).await?;
        self.rbac
            .require(ctx.principal(), Permission::FilesDeleteOwn, Some(&file.owner()))?;

        self.shares.delete_file_shares(file_id).await?;
        if let Err(e) = self.blobs.delete(&file.stored_path).await {
            warn!(file_id = %file_id, error = %e, "Failed to remove stored bytes");
        }
        if !self.files.delete(file_id).await? {
            return Err(AppError::not_found(format!("File {file_id} not found")));
        }
        if let Some(owner) = quota_owner_of(&file) {
            if let Err(e) = self.ledger.release(owner, file.size_bytes).await {
                warn!(file_id = %file_id, error = %e, "Failed to release quota");
            }
        }

        info!(file_id = %file_id, size = file.size_bytes, "File deleted");
        Ok(())
    }

    /// Anonymous download through a share link: validates and counts the
    /// download, then reads the bytes.
    pub async fn download_shared(
        &self,
        token: &str,
        password: Option<&str>,
    ) -> AppResult<(SharedDownload, Bytes)> {
        let download = self.shares.redeem(token, password).await?;
        let data = self.blobs.read(&download.file.stored_path).await?;
        Ok((download, data))
    }

    async fn find(&self, file_id: Uuid) -> AppResult<FileRecord> {
        self.files
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))
    }

    async fn discard_blob(&self, stored_path: &str) {
        if let Err(e) = self.blobs.delete(stored_path).await {
            error!(stored_path = %stored_path, error = %e, "Failed to remove orphaned upload");
        }
    }
}
