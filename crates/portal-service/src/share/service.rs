//! Share CRUD service.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use portal_auth::password::PasswordHasher;
use portal_auth::rbac::{Permission, RbacEngine};
use portal_core::error::AppError;
use portal_core::result::AppResult;
use portal_database::store::{FileCatalog, ShareStore};
use portal_entity::share::{NewShareToken, ShareLink, ShareToken};

use super::access::{AccessService, SharedDownload};
use super::link::LinkService;
use crate::context::RequestContext;

/// Manages share creation, listing, and revocation.
#[derive(Debug, Clone)]
pub struct ShareService {
    /// Share tokens.
    shares: Arc<dyn ShareStore>,
    /// File metadata.
    files: Arc<dyn FileCatalog>,
    /// Token generation and URLs.
    links: Arc<LinkService>,
    /// Anonymous validation path.
    access: Arc<AccessService>,
    /// Password hasher for protected shares.
    hasher: Arc<PasswordHasher>,
    /// Permission checks.
    rbac: Arc<RbacEngine>,
}

/// Options for a new share.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareOptions {
    /// Listed publicly.
    #[serde(default = "default_public")]
    pub is_public: bool,
    /// Download password; empty means none.
    #[serde(default)]
    pub password: Option<String>,
    /// Expiry.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    /// Download cap, must be positive.
    #[serde(default)]
    pub max_downloads: Option<i32>,
}

fn default_public() -> bool {
    true
}

impl Default for ShareOptions {
    fn default() -> Self {
        Self {
            is_public: true,
            password: None,
            expires_at: None,
            max_downloads: None,
        }
    }
}

/// Request to update an existing share.
///
/// The nested options on `expires_at` and `max_downloads` distinguish
/// "leave alone" (`None`) from "clear" (`Some(None)`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateShareRequest {
    /// Update public listing.
    pub is_public: Option<bool>,
    /// New password; an empty string removes protection.
    pub password: Option<String>,
    /// Update expiration.
    pub expires_at: Option<Option<DateTime<Utc>>>,
    /// Update max downloads.
    pub max_downloads: Option<Option<i32>>,
    /// Update active state.
    pub is_active: Option<bool>,
}

impl UpdateShareRequest {
    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        self.is_public.is_none()
            && self.password.is_none()
            && self.expires_at.is_none()
            && self.max_downloads.is_none()
            && self.is_active.is_none()
    }
}

fn check_max_downloads(max_downloads: Option<i32>) -> AppResult<()> {
    match max_downloads {
        Some(max) if max <= 0 => Err(AppError::validation(
            "Maximum downloads must be a positive number",
        )),
        _ => Ok(()),
    }
}

impl ShareService {
    /// Creates a new share service.
    pub fn new(
        shares: Arc<dyn ShareStore>,
        files: Arc<dyn FileCatalog>,
        links: Arc<LinkService>,
        hasher: Arc<PasswordHasher>,
        rbac: Arc<RbacEngine>,
    ) -> Self {
        let access = Arc::new(AccessService::new(
            shares.clone(),
            files.clone(),
            hasher.clone(),
        ));
        Self {
            shares,
            files,
            links,
            access,
            hasher,
            rbac,
        }
    }

    /// The anonymous access path.
    pub fn access(&self) -> &AccessService {
        &self.access
    }

    /// Create a share link for a file.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        options: ShareOptions,
    ) -> AppResult<ShareLink> {
        let file = self
            .files
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))?;

        let principal = ctx.require_principal()?;
        let owner_user_id = principal
            .user_id()
            .ok_or_else(|| AppError::permission_denied("Access-code sessions cannot share files"))?;

        self.rbac
            .require(ctx.principal(), Permission::FilesShare, Some(&file.owner()))?;
        check_max_downloads(options.max_downloads)?;

        let password_hash = match options.password.as_deref() {
            Some(p) if !p.is_empty() => Some(self.hasher.hash_password(p)?),
            _ => None,
        };

        let share = self
            .shares
            .create(&NewShareToken {
                file_id,
                owner_user_id,
                token: self.links.generate_token(),
                is_public: options.is_public,
                password_hash,
                expires_at: options.expires_at,
                max_downloads: options.max_downloads,
            })
            .await?;

        info!(
            user_id = %owner_user_id,
            share_id = %share.id,
            file_id = %file_id,
            protected = share.is_password_protected(),
            "Share created"
        );

        Ok(self.links.link_for(&share))
    }

    /// See [`AccessService::validate`].
    pub async fn validate(&self, token: &str, password: Option<&str>) -> AppResult<SharedDownload> {
        self.access.validate(token, password).await
    }

    /// See [`AccessService::record_download`].
    pub async fn record_download(&self, share_id: Uuid) -> AppResult<i32> {
        self.access.record_download(share_id).await
    }

    /// See [`AccessService::redeem`].
    pub async fn redeem(&self, token: &str, password: Option<&str>) -> AppResult<SharedDownload> {
        self.access.redeem(token, password).await
    }

    /// Gets a share the caller may manage.
    pub async fn get_share(&self, ctx: &RequestContext, share_id: Uuid) -> AppResult<ShareToken> {
        let share = self
            .shares
            .find_by_id(share_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Share {share_id} not found")))?;

        if !self.rbac.can_share(ctx.principal(), &share.owner()) {
            return Err(AppError::permission_denied(
                "Only the share owner or an admin can manage this share",
            ));
        }
        Ok(share)
    }

    /// Apply an update to a share.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        share_id: Uuid,
        req: UpdateShareRequest,
    ) -> AppResult<ShareToken> {
        if req.is_empty() {
            return Err(AppError::validation("No fields to update"));
        }
        let mut share = self.get_share(ctx, share_id).await?;

        if let Some(is_public) = req.is_public {
            share.is_public = is_public;
        }
        if let Some(password) = req.password.as_deref() {
            share.password_hash = if password.is_empty() {
                None
            } else {
                Some(self.hasher.hash_password(password)?)
            };
        }
        if let Some(expires_at) = req.expires_at {
            share.expires_at = expires_at;
        }
        if let Some(max_downloads) = req.max_downloads {
            check_max_downloads(max_downloads)?;
            if let Some(max) = max_downloads.filter(|max| *max < share.download_count) {
                return Err(AppError::validation(format!(
                    "max_downloads {max} is below the {} downloads already served",
                    share.download_count
                )));
            }
            share.max_downloads = max_downloads;
        }
        if let Some(is_active) = req.is_active {
            share.is_active = is_active;
        }

        let updated = self
            .shares
            .update(&share)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Share {share_id} not found")))?;

        info!(share_id = %share_id, "Share updated");
        Ok(updated)
    }

    /// Soft-delete: the link stops working but stays listed for its owner.
    pub async fn deactivate(&self, ctx: &RequestContext, share_id: Uuid) -> AppResult<()> {
        self.get_share(ctx, share_id).await?;
        if !self.shares.deactivate(share_id).await? {
            return Err(AppError::not_found(format!("Share {share_id} not found")));
        }
        info!(share_id = %share_id, "Share deactivated");
        Ok(())
    }

    /// Remove a share. The file is untouched.
    pub async fn delete(&self, ctx: &RequestContext, share_id: Uuid) -> AppResult<()> {
        self.get_share(ctx, share_id).await?;
        if !self.shares.delete(share_id).await? {
            return Err(AppError::not_found(format!("Share {share_id} not found")));
        }
        info!(share_id = %share_id, "Share deleted");
        Ok(())
    }

    /// Drop every share of a file. Callers authorize the file removal.
    pub async fn delete_file_shares(&self, file_id: Uuid) -> AppResult<u64> {
        let removed = self.shares.delete_by_file(file_id).await?;
        if removed > 0 {
            info!(file_id = %file_id, removed = removed, "File shares removed");
        }
        Ok(removed)
    }

    /// Shares created by the caller. Access-code sessions own none.
    pub async fn list_my(&self, ctx: &RequestContext) -> AppResult<Vec<ShareToken>> {
        match ctx.require_principal()?.user_id() {
            Some(user_id) => self.shares.list_by_owner(user_id).await,
            None => Ok(Vec::new()),
        }
    }

    /// Shares of one file, for its owner or an admin.
    pub async fn list_file(&self, ctx: &RequestContext, file_id: Uuid) -> AppResult<Vec<ShareToken>> {
        let file = self
            .files
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))?;
        self.rbac
            .require(ctx.principal(), Permission::FilesShare, Some(&file.owner()))?;
        self.shares.list_by_file(file_id).await
    }

    /// See [`AccessService::list_public`].
    pub async fn list_public(&self) -> AppResult<Vec<ShareToken>> {
        self.access.list_public().await
    }

    /// Every share (admin only).
    pub async fn list_all(&self, ctx: &RequestContext) -> AppResult<Vec<ShareToken>> {
        self.rbac
            .require(ctx.principal(), Permission::FilesShareAll, None)?;
        self.shares.list_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    use chrono::Duration;
    use futures::future::join_all;

    use portal_core::error::ErrorKind;
    use portal_database::MemoryStore;
    use portal_entity::file::CreateFileRecord;
    use portal_entity::principal::{PrincipalKind, PrincipalRef, ResourceOwner};
    use portal_entity::user::Role;

    const ADDR: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));

    struct Fixture {
        store: MemoryStore,
        service: ShareService,
    }

    fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let shared = Arc::new(store.clone());
        let service = ShareService::new(
            shared.clone(),
            shared,
            Arc::new(LinkService::default()),
            Arc::new(PasswordHasher::new()),
            Arc::new(RbacEngine::new()),
        );
        Fixture { store, service }
    }

    fn user(role: Role, label: &str) -> RequestContext {
        RequestContext::authenticated(
            PrincipalRef {
                kind: PrincipalKind::User,
                id: Uuid::new_v4(),
                label: label.to_string(),
                role,
            },
            ADDR,
        )
    }

    async fn file_of(store: &MemoryStore, ctx: &RequestContext) -> Uuid {
        let owner = ResourceOwner::user(ctx.principal.as_ref().unwrap().id);
        FileCatalog::insert(
            store,
            &CreateFileRecord {
                original_filename: "report.pdf".to_string(),
                stored_path: "stored.pdf".to_string(),
                size_bytes: 10,
                file_hash: "00".repeat(32),
                mime_type: Some("application/pdf".to_string()),
                owner,
            },
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn test_password_round_trip() {
        let f = fixture();
        let alice = user(Role::User, "alice");
        let file_id = file_of(&f.store, &alice).await;

        let link = f
            .service
            .create(
                &alice,
                file_id,
                ShareOptions {
                    password: Some("hunter22".to_string()),
                    ..ShareOptions::default()
                },
            )
            .await
            .unwrap();
        assert!(link.is_password_protected);
        assert_eq!(link.token.len(), 64);
        assert!(link.url.ends_with(&format!("?token={}", link.token)));

        let missing = f.service.validate(&link.token, None).await.unwrap_err();
        assert_eq!(missing.kind, ErrorKind::PasswordRequired);
        let empty = f.service.validate(&link.token, Some("")).await.unwrap_err();
        assert_eq!(empty.kind, ErrorKind::PasswordRequired);
        let wrong = f.service.validate(&link.token, Some("nope")).await.unwrap_err();
        assert_eq!(wrong.kind, ErrorKind::InvalidPassword);

        let ok = f.service.validate(&link.token, Some("hunter22")).await.unwrap();
        assert_eq!(ok.file.id, file_id);
        assert_eq!(ok.share.download_count, 0);
    }

    #[tokio::test]
    async fn test_unprotected_share_ignores_password() {
        let f = fixture();
        let alice = user(Role::User, "alice");
        let file_id = file_of(&f.store, &alice).await;
        let link = f
            .service
            .create(&alice, file_id, ShareOptions::default())
            .await
            .unwrap();

        assert!(f.service.validate(&link.token, None).await.is_ok());
        assert!(f.service.validate(&link.token, Some("anything")).await.is_ok());
    }

    #[tokio::test]
    async fn test_expired_share_reports_expiry_before_password() {
        let f = fixture();
        let alice = user(Role::User, "alice");
        let file_id = file_of(&f.store, &alice).await;
        let link = f
            .service
            .create(
                &alice,
                file_id,
                ShareOptions {
                    password: Some("hunter22".to_string()),
                    expires_at: Some(Utc::now() - Duration::seconds(1)),
                    ..ShareOptions::default()
                },
            )
            .await
            .unwrap();

        let err = f.service.validate(&link.token, None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::AlreadyExpired);
    }

    #[tokio::test]
    async fn test_unknown_token_and_deleted_file() {
        let f = fixture();
        let alice = user(Role::User, "alice");
        let file_id = file_of(&f.store, &alice).await;
        let link = f
            .service
            .create(&alice, file_id, ShareOptions::default())
            .await
            .unwrap();

        let unknown = f.service.validate(&"0".repeat(64), None).await.unwrap_err();
        assert_eq!(unknown.kind, ErrorKind::NotFound);

        FileCatalog::delete(&f.store, file_id).await.unwrap();
        let gone = f.service.validate(&link.token, None).await.unwrap_err();
        assert_eq!(gone.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_concurrent_downloads_respect_cap() {
        let f = fixture();
        let alice = user(Role::User, "alice");
        let file_id = file_of(&f.store, &alice).await;
        let link = f
            .service
            .create(
                &alice,
                file_id,
                ShareOptions {
                    max_downloads: Some(3),
                    ..ShareOptions::default()
                },
            )
            .await
            .unwrap();

        let tasks = (0..10).map(|_| {
            let service = f.service.clone();
            let token = link.token.clone();
            tokio::spawn(async move { service.redeem(&token, None).await })
        });
        let results: Vec<_> = join_all(tasks).await.into_iter().map(|r| r.unwrap()).collect();

        let ok = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(ok, 3);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| e.kind == ErrorKind::DownloadLimitReached));

        let share = f.service.get_share(&alice, link.share_id).await.unwrap();
        assert_eq!(share.download_count, 3);
    }

    #[tokio::test]
    async fn test_rejects_non_positive_cap() {
        let f = fixture();
        let alice = user(Role::User, "alice");
        let file_id = file_of(&f.store, &alice).await;
        let err = f
            .service
            .create(
                &alice,
                file_id,
                ShareOptions {
                    max_downloads: Some(0),
                    ..ShareOptions::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_only_owner_or_admin_may_share() {
        let f = fixture();
        let alice = user(Role::User, "alice");
        let bob = user(Role::User, "bob");
        let admin = user(Role::Admin, "root");
        let file_id = file_of(&f.store, &alice).await;

        let err = f
            .service
            .create(&bob, file_id, ShareOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::PermissionDenied);

        assert!(f
            .service
            .create(&admin, file_id, ShareOptions::default())
            .await
            .is_ok());

        let missing = f
            .service
            .create(&alice, Uuid::new_v4(), ShareOptions::default())
            .await
            .unwrap_err();
        assert_eq!(missing.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_access_code_cannot_own_share() {
        let f = fixture();
        let code = RequestContext::authenticated(
            PrincipalRef {
                kind: PrincipalKind::AccessCode,
                id: Uuid::new_v4(),
                label: "code-12345678".to_string(),
                role: Role::User,
            },
            ADDR,
        );
        let owner = ResourceOwner::code(code.principal.as_ref().unwrap().id);
        let file = FileCatalog::insert(
            &f.store,
            &CreateFileRecord {
                original_filename: "a.txt".to_string(),
                stored_path: "a".to_string(),
                size_bytes: 1,
                file_hash: "00".repeat(32),
                mime_type: None,
                owner,
            },
        )
        .await
        .unwrap();

        let err = f
            .service
            .create(&code, file.id, ShareOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::PermissionDenied);
        assert!(f.service.list_my(&code).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_and_clear_fields() {
        let f = fixture();
        let alice = user(Role::User, "alice");
        let bob = user(Role::User, "bob");
        let file_id = file_of(&f.store, &alice).await;
        let link = f
            .service
            .create(
                &alice,
                file_id,
                ShareOptions {
                    password: Some("hunter22".to_string()),
                    max_downloads: Some(5),
                    ..ShareOptions::default()
                },
            )
            .await
            .unwrap();

        let empty = f
            .service
            .update(&alice, link.share_id, UpdateShareRequest::default())
            .await
            .unwrap_err();
        assert_eq!(empty.kind, ErrorKind::Validation);

        let denied = f
            .service
            .update(
                &bob,
                link.share_id,
                UpdateShareRequest {
                    is_public: Some(false),
                    ..UpdateShareRequest::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(denied.kind, ErrorKind::PermissionDenied);

        let updated = f
            .service
            .update(
                &alice,
                link.share_id,
                UpdateShareRequest {
                    password: Some(String::new()),
                    max_downloads: Some(None),
                    ..UpdateShareRequest::default()
                },
            )
            .await
            .unwrap();
        assert!(!updated.is_password_protected());
        assert_eq!(updated.max_downloads, None);
        assert!(f.service.validate(&link.token, None).await.is_ok());
    }

    #[tokio::test]
    async fn test_cap_cannot_drop_below_served_downloads() {
        let f = fixture();
        let alice = user(Role::User, "alice");
        let file_id = file_of(&f.store, &alice).await;
        let link = f
            .service
            .create(
                &alice,
                file_id,
                ShareOptions {
                    max_downloads: Some(5),
                    ..ShareOptions::default()
                },
            )
            .await
            .unwrap();
        for _ in 0..3 {
            f.service.redeem(&link.token, None).await.unwrap();
        }

        let cap = |max| UpdateShareRequest {
            max_downloads: Some(Some(max)),
            ..UpdateShareRequest::default()
        };
        let err = f
            .service
            .update(&alice, link.share_id, cap(2))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let unchanged = f.service.get_share(&alice, link.share_id).await.unwrap();
        assert_eq!(unchanged.max_downloads, Some(5));
        assert_eq!(unchanged.download_count, 3);

        let updated = f
            .service
            .update(&alice, link.share_id, cap(3))
            .await
            .unwrap();
        assert_eq!(updated.max_downloads, Some(3));
        assert!(updated.limit_reached());
        let err = f.service.redeem(&link.token, None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::DownloadLimitReached);
    }

    #[tokio::test]
    async fn test_deactivate_then_delete() {
        let f = fixture();
        let alice = user(Role::User, "alice");
        let file_id = file_of(&f.store, &alice).await;
        let link = f
            .service
            .create(&alice, file_id, ShareOptions::default())
            .await
            .unwrap();

        f.service.deactivate(&alice, link.share_id).await.unwrap();
        let err = f.service.validate(&link.token, None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Deactivated);
        assert_eq!(f.service.list_my(&alice).await.unwrap().len(), 1);
        assert!(f.service.list_public().await.unwrap().is_empty());

        f.service.delete(&alice, link.share_id).await.unwrap();
        assert!(f.service.list_my(&alice).await.unwrap().is_empty());
        assert!(FileCatalog::find_by_id(&f.store, file_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_listings() {
        let f = fixture();
        let alice = user(Role::User, "alice");
        let admin = user(Role::Admin, "root");
        let file_id = file_of(&f.store, &alice).await;

        f.service
            .create(&alice, file_id, ShareOptions::default())
            .await
            .unwrap();
        f.service
            .create(
                &alice,
                file_id,
                ShareOptions {
                    is_public: false,
                    ..ShareOptions::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(f.service.list_public().await.unwrap().len(), 1);
        assert_eq!(f.service.list_file(&alice, file_id).await.unwrap().len(), 2);
        assert_eq!(f.service.list_all(&admin).await.unwrap().len(), 2);

        let err = f.service.list_all(&alice).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::PermissionDenied);

        assert_eq!(f.service.delete_file_shares(file_id).await.unwrap(), 2);
        assert!(f.service.list_all(&admin).await.unwrap().is_empty());
    }
}
