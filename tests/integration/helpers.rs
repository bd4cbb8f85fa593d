//! Shared test helpers for integration tests.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Mutex;

use portal_auth::login::{Authenticator, Credential, RateLimiter};
use portal_auth::password::{PasswordHasher, PasswordService};
use portal_auth::rbac::RbacEngine;
use portal_auth::session::{Session, SessionManager};
use portal_core::config::AppConfig;
use portal_core::error::AppError;
use portal_core::result::AppResult;
use portal_database::MemoryStore;
use portal_entity::access_code::{AccessCode, CreateAccessCode};
use portal_entity::file::FileRecord;
use portal_entity::user::{CreateUser, Role, UserAccount};
use portal_service::file::{BlobStorage, FileService, UploadRequest};
use portal_service::quota::QuotaLedger;
use portal_service::share::{LinkService, ShareService};
use portal_service::RequestContext;

/// Address used when a test does not care about the origin.
pub const CLIENT: IpAddr = IpAddr::V4(Ipv4Addr::new(203, 0, 113, 7));

/// Blob storage kept in memory.
#[derive(Debug, Default)]
pub struct MemoryBlobs {
    blobs: Mutex<HashMap<String, Bytes>>,
}

impl MemoryBlobs {
    /// Number of stored blobs.
    pub async fn len(&self) -> usize {
        self.blobs.lock().await.len()
    }
}

#[async_trait]
impl BlobStorage for MemoryBlobs {
    async fn write(&self, name: &str, data: Bytes) -> AppResult<()> {
        self.blobs.lock().await.insert(name.to_string(), data);
        Ok(())
    }

    async fn read(&self, name: &str) -> AppResult<Bytes> {
        self.blobs
            .lock()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Blob {name} missing")))
    }

    async fn delete(&self, name: &str) -> AppResult<()> {
        self.blobs.lock().await.remove(name);
        Ok(())
    }

    async fn exists(&self, name: &str) -> AppResult<bool> {
        Ok(self.blobs.lock().await.contains_key(name))
    }
}

/// Test application context wired over the in-memory store.
pub struct TestApp {
    /// Backing store for direct inspection.
    pub store: MemoryStore,
    /// Stored file contents.
    pub blobs: Arc<MemoryBlobs>,
    /// Application config.
    pub config: AppConfig,
    /// Login entry point.
    pub authenticator: Authenticator,
    /// Session state machine.
    pub sessions: SessionManager,
    /// Self-service password change.
    pub passwords: PasswordService,
    /// Share links.
    pub shares: Arc<ShareService>,
    /// Uploads and removals.
    pub files: FileService,
    /// Quota reads.
    pub ledger: QuotaLedger,
    /// Password hashing for fixtures.
    pub hasher: PasswordHasher,
}

impl TestApp {
    /// Create a new test application with default configuration.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create a new test application.
    pub fn with_config(config: AppConfig) -> Self {
        let store = MemoryStore::new();
        let shared = Arc::new(store.clone());
        let blobs = Arc::new(MemoryBlobs::default());
        let hasher = Arc::new(PasswordHasher::new());
        let rbac = Arc::new(RbacEngine::new());

        let limiter = RateLimiter::new(shared.clone(), &config.auth).unwrap();
        let authenticator = Authenticator::new(shared.clone(), limiter);
        let sessions = SessionManager::new(&config.session).unwrap();
        let passwords = PasswordService::new(shared.clone(), &config.auth);

        let shares = Arc::new(ShareService::new(
            shared.clone(),
            shared.clone(),
            Arc::new(LinkService::new(config.share.clone())),
            hasher,
            rbac.clone(),
        ));
        let ledger = QuotaLedger::new(shared.clone());
        let files = FileService::new(
            shared,
            blobs.clone(),
            ledger.clone(),
            shares.clone(),
            rbac,
            config.upload.clone(),
        );

        Self {
            store,
            blobs,
            config,
            authenticator,
            sessions,
            passwords,
            shares,
            files,
            ledger,
            hasher: PasswordHasher::new(),
        }
    }

    /// Create an account with a hashed password.
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        role: Role,
        quota: i64,
    ) -> UserAccount {
        self.store
            .create_user(&CreateUser {
                username: username.to_string(),
                email: Some(format!("{username}@example.test")),
                password_hash: self.hasher.hash_password(password).unwrap(),
                role,
                upload_quota: quota,
                is_temporary: false,
                expiry_date: None,
            })
            .await
            .unwrap()
    }

    /// Issue an access code.
    pub async fn create_code(&self, code: &str, max_uses: i32, quota: i64) -> AccessCode {
        self.store
            .create_code(&CreateAccessCode {
                code: code.to_string(),
                max_uses,
                upload_quota: quota,
                expiry_date: None,
                created_by: None,
            })
            .await
            .unwrap()
    }

    /// Authenticate and bind the principal to a fresh session.
    pub async fn login(&self, credential: Credential, client: IpAddr) -> AppResult<Session> {
        let principal = self.authenticator.authenticate(&credential, client).await?;
        let mut session = Session::new();
        self.sessions.establish(&mut session, principal.to_ref());
        Ok(session)
    }

    /// Log in with a username and password from [`CLIENT`].
    pub async fn login_user(&self, username: &str, password: &str) -> Session {
        self.login(
            Credential::Password {
                username: username.to_string(),
                password: password.to_string(),
            },
            CLIENT,
        )
        .await
        .unwrap()
    }

    /// Request context for the session's current state.
    pub fn ctx(&self, session: &mut Session) -> RequestContext {
        let status = self.sessions.check(session);
        RequestContext::from_status(&status, CLIENT)
    }

    /// Upload `len` bytes as `name`.
    pub async fn upload(&self, ctx: &RequestContext, name: &str, len: usize) -> AppResult<FileRecord> {
        self.files
            .upload(
                ctx,
                UploadRequest {
                    file_name: name.to_string(),
                    mime_type: None,
                    data: Bytes::from(vec![7u8; len]),
                },
            )
            .await
    }
}
