//! In-memory store using a Tokio mutex for single-node deployments and tests.
//!
//! Every operation takes the one lock for its whole duration, so each
//! conditional update is as atomic as its SQL counterpart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use portal_core::error::AppError;
use portal_core::result::AppResult;
use portal_entity::access_code::{AccessCode, CreateAccessCode};
use portal_entity::attempt::LoginAttempt;
use portal_entity::file::{CreateFileRecord, FileRecord};
use portal_entity::principal::ResourceOwner;
use portal_entity::quota::{QuotaOwner, QuotaUsage};
use portal_entity::share::{NewShareToken, ShareToken};
use portal_entity::user::{CreateUser, UserAccount};

use crate::store::{AccountStore, FileCatalog, LoginAttemptStore, QuotaStore, ShareStore};

/// Internal state for the memory store.
#[derive(Debug, Default)]
struct InnerState {
    users: HashMap<Uuid, UserAccount>,
    codes: HashMap<Uuid, AccessCode>,
    attempts: Vec<LoginAttempt>,
    files: HashMap<Uuid, FileRecord>,
    shares: HashMap<Uuid, ShareToken>,
}

/// In-memory implementation of every store trait.
///
/// Cloning shares the underlying state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    /// Protected inner state.
    state: Arc<Mutex<InnerState>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully-formed account.
    pub async fn insert_user(&self, user: UserAccount) -> UserAccount {
        let mut state = self.state.lock().await;
        state.users.insert(user.id, user.clone());
        user
    }

    /// Create an account the way the database would.
    pub async fn create_user(&self, data: &CreateUser) -> AppResult<UserAccount> {
        let mut state = self.state.lock().await;
        if state.users.values().any(|u| u.username == data.username) {
            return Err(AppError::validation(format!(
                "Username '{}' already exists",
                data.username
            )));
        }
        let user = UserAccount {
            id: Uuid::new_v4(),
            username: data.username.clone(),
            email: data.email.clone(),
            password_hash: data.password_hash.clone(),
            role: data.role,
            upload_quota: data.upload_quota,
            used_quota: 0,
            is_temporary: data.is_temporary,
            expiry_date: data.expiry_date,
            is_active: true,
            last_login: None,
            created_at: Utc::now(),
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    /// Issue an access code the way the database would.
    pub async fn create_code(&self, data: &CreateAccessCode) -> AppResult<AccessCode> {
        let mut state = self.state.lock().await;
        if state.codes.values().any(|c| c.code == data.code) {
            return Err(AppError::validation("Access code already exists"));
        }
        let code = AccessCode {
            id: Uuid::new_v4(),
            code: data.code.clone(),
            max_uses: data.max_uses,
            current_uses: 0,
            upload_quota: data.upload_quota,
            used_quota: 0,
            expiry_date: data.expiry_date,
            is_active: true,
            created_by: data.created_by,
            created_at: Utc::now(),
        };
        state.codes.insert(code.id, code.clone());
        Ok(code)
    }

    /// Overwrite an account's used quota (fixture setup).
    pub async fn set_used_quota(&self, owner: QuotaOwner, used: i64) {
        let mut state = self.state.lock().await;
        match owner {
            QuotaOwner::User(id) => {
                if let Some(user) = state.users.get_mut(&id) {
                    user.used_quota = used;
                }
            }
            QuotaOwner::AccessCode(id) => {
                if let Some(code) = state.codes.get_mut(&id) {
                    code.used_quota = used;
                }
            }
        }
    }

    /// Snapshot of every recorded login attempt.
    pub async fn attempts(&self) -> Vec<LoginAttempt> {
        self.state.lock().await.attempts.clone()
    }
}

fn quota_counters(state: &mut InnerState, owner: QuotaOwner) -> Option<(i64, &mut i64)> {
    match owner {
        QuotaOwner::User(id) => state
            .users
            .get_mut(&id)
            .map(|u| (u.upload_quota, &mut u.used_quota)),
        QuotaOwner::AccessCode(id) => state
            .codes
            .get_mut(&id)
            .map(|c| (c.upload_quota, &mut c.used_quota)),
    }
}

fn newest_first(mut shares: Vec<ShareToken>) -> Vec<ShareToken> {
    shares.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    shares
}

fn newest_uploads_first(mut files: Vec<FileRecord>) -> Vec<FileRecord> {
    files.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
    files
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn find_active_user_by_username(
        &self,
        username: &str,
    ) -> AppResult<Option<UserAccount>> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .find(|u| u.username == username && u.is_active)
            .cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> AppResult<Option<UserAccount>> {
        Ok(self.state.lock().await.users.get(&id).cloned())
    }

    async fn update_password_hash(&self, user_id: Uuid, password_hash: &str) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        Ok(state
            .users
            .get_mut(&user_id)
            .map(|user| user.password_hash = password_hash.to_string())
            .is_some())
    }

    async fn touch_last_login(&self, user_id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if let Some(user) = state.users.get_mut(&user_id) {
            user.last_login = Some(at);
        }
        Ok(())
    }

    async fn find_active_code(&self, code: &str) -> AppResult<Option<AccessCode>> {
        let state = self.state.lock().await;
        Ok(state
            .codes
            .values()
            .find(|c| c.code == code && c.is_active)
            .cloned())
    }

    async fn find_code_by_id(&self, id: Uuid) -> AppResult<Option<AccessCode>> {
        Ok(self.state.lock().await.codes.get(&id).cloned())
    }

    async fn redeem_access_code(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Option<AccessCode>> {
        let mut state = self.state.lock().await;
        let Some(code) = state.codes.get_mut(&id) else {
            return Ok(None);
        };
        if !code.is_active || code.is_exhausted() || code.is_expired_at(now) {
            return Ok(None);
        }
        code.current_uses += 1;
        Ok(Some(code.clone()))
    }

    async fn deactivate_expired_codes(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let mut count = 0;
        for code in state.codes.values_mut() {
            if code.is_active && code.is_expired_at(now) {
                code.is_active = false;
                count += 1;
            }
        }
        if count > 0 {
            debug!(count = count, "Deactivated expired access codes");
        }
        Ok(count)
    }
}

#[async_trait]
impl LoginAttemptStore for MemoryStore {
    async fn append(&self, attempt: &LoginAttempt) -> AppResult<()> {
        self.state.lock().await.attempts.push(attempt.clone());
        Ok(())
    }

    async fn count_failed_since(&self, identifier: &str, since: DateTime<Utc>) -> AppResult<u64> {
        let state = self.state.lock().await;
        Ok(state
            .attempts
            .iter()
            .filter(|a| a.identifier == identifier && !a.was_successful && a.attempt_time > since)
            .count() as u64)
    }

    async fn clear_failed(&self, identifier: &str) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let before = state.attempts.len();
        state
            .attempts
            .retain(|a| !(a.identifier == identifier && !a.was_successful));
        Ok((before - state.attempts.len()) as u64)
    }

    async fn prune_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let before = state.attempts.len();
        state.attempts.retain(|a| a.attempt_time >= cutoff);
        Ok((before - state.attempts.len()) as u64)
    }
}

#[async_trait]
impl FileCatalog for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<FileRecord>> {
        Ok(self.state.lock().await.files.get(&id).cloned())
    }

    async fn insert(&self, data: &CreateFileRecord) -> AppResult<FileRecord> {
        let mut state = self.state.lock().await;
        let record = FileRecord {
            id: Uuid::new_v4(),
            original_filename: data.original_filename.clone(),
            stored_path: data.stored_path.clone(),
            size_bytes: data.size_bytes,
            file_hash: data.file_hash.clone(),
            mime_type: data.mime_type.clone(),
            owner_user_id: data.owner.user,
            owner_code_id: data.owner.code,
            uploaded_at: Utc::now(),
            expiry_date: None,
        };
        state.files.insert(record.id, record.clone());
        Ok(record)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        let removed = state.files.remove(&id).is_some();
        if removed {
            state.shares.retain(|_, s| s.file_id != id);
        }
        Ok(removed)
    }

    async fn list_by_owner(&self, owner: &ResourceOwner) -> AppResult<Vec<FileRecord>> {
        if owner.user.is_none() && owner.code.is_none() {
            return Ok(Vec::new());
        }
        let state = self.state.lock().await;
        let files = state
            .files
            .values()
            .filter(|f| f.owner() == *owner)
            .cloned()
            .collect();
        Ok(newest_uploads_first(files))
    }

    async fn list_all(&self) -> AppResult<Vec<FileRecord>> {
        let state = self.state.lock().await;
        Ok(newest_uploads_first(state.files.values().cloned().collect()))
    }

    async fn update_expiry(
        &self,
        id: Uuid,
        expiry_date: Option<DateTime<Utc>>,
    ) -> AppResult<Option<FileRecord>> {
        let mut state = self.state.lock().await;
        Ok(state.files.get_mut(&id).map(|file| {
            file.expiry_date = expiry_date;
            file.clone()
        }))
    }
}

#[async_trait]
impl QuotaStore for MemoryStore {
    async fn usage(&self, owner: QuotaOwner) -> AppResult<Option<QuotaUsage>> {
        let mut state = self.state.lock().await;
        Ok(quota_counters(&mut state, owner).map(|(total, used)| QuotaUsage::new(total, *used)))
    }

    async fn try_charge(&self, owner: QuotaOwner, bytes: i64) -> AppResult<Option<QuotaUsage>> {
        let mut state = self.state.lock().await;
        let Some((total, used)) = quota_counters(&mut state, owner) else {
            return Ok(None);
        };
        if used.saturating_add(bytes) > total {
            return Ok(None);
        }
        *used += bytes;
        Ok(Some(QuotaUsage::new(total, *used)))
    }

    async fn release(&self, owner: QuotaOwner, bytes: i64) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if let Some((_, used)) = quota_counters(&mut state, owner) {
            *used = (*used - bytes).max(0);
        }
        Ok(())
    }
}

#[async_trait]
impl ShareStore for MemoryStore {
    async fn create(&self, data: &NewShareToken) -> AppResult<ShareToken> {
        let mut state = self.state.lock().await;
        if state.shares.values().any(|s| s.token == data.token) {
            return Err(AppError::storage("Duplicate share token"));
        }
        let share = ShareToken {
            id: Uuid::new_v4(),
            file_id: data.file_id,
            owner_user_id: data.owner_user_id,
            token: data.token.clone(),
            is_public: data.is_public,
            password_hash: data.password_hash.clone(),
            expires_at: data.expires_at,
            max_downloads: data.max_downloads,
            download_count: 0,
            is_active: true,
            created_at: Utc::now(),
        };
        state.shares.insert(share.id, share.clone());
        Ok(share)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ShareToken>> {
        Ok(self.state.lock().await.shares.get(&id).cloned())
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<ShareToken>> {
        let state = self.state.lock().await;
        Ok(state.shares.values().find(|s| s.token == token).cloned())
    }

    async fn update(&self, share: &ShareToken) -> AppResult<Option<ShareToken>> {
        let mut state = self.state.lock().await;
        let Some(stored) = state.shares.get_mut(&share.id) else {
            return Ok(None);
        };
        if share.max_downloads.is_some_and(|max| max < stored.download_count) {
            return Err(AppError::validation(format!(
                "Share {} already has {} downloads",
                share.id, stored.download_count
            )));
        }
        stored.is_public = share.is_public;
        stored.password_hash = share.password_hash.clone();
        stored.expires_at = share.expires_at;
        stored.max_downloads = share.max_downloads;
        stored.is_active = share.is_active;
        Ok(Some(stored.clone()))
    }

    async fn try_increment_download(&self, id: Uuid) -> AppResult<Option<i32>> {
        let mut state = self.state.lock().await;
        let Some(share) = state.shares.get_mut(&id) else {
            return Ok(None);
        };
        if !share.is_active || share.limit_reached() {
            return Ok(None);
        }
        share.download_count += 1;
        Ok(Some(share.download_count))
    }

    async fn deactivate(&self, id: Uuid) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        Ok(match state.shares.get_mut(&id) {
            Some(share) => {
                share.is_active = false;
                true
            }
            None => false,
        })
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.state.lock().await.shares.remove(&id).is_some())
    }

    async fn delete_by_file(&self, file_id: Uuid) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let before = state.shares.len();
        state.shares.retain(|_, s| s.file_id != file_id);
        Ok((before - state.shares.len()) as u64)
    }

    async fn list_by_owner(&self, user_id: Uuid) -> AppResult<Vec<ShareToken>> {
        let state = self.state.lock().await;
        Ok(newest_first(
            state
                .shares
                .values()
                .filter(|s| s.owner_user_id == user_id)
                .cloned()
                .collect(),
        ))
    }

    async fn list_by_file(&self, file_id: Uuid) -> AppResult<Vec<ShareToken>> {
        let state = self.state.lock().await;
        Ok(newest_first(
            state
                .shares
                .values()
                .filter(|s| s.file_id == file_id)
                .cloned()
                .collect(),
        ))
    }

    async fn list_public(&self, now: DateTime<Utc>) -> AppResult<Vec<ShareToken>> {
        let state = self.state.lock().await;
        Ok(newest_first(
            state
                .shares
                .values()
                .filter(|s| s.is_publicly_listed_at(now))
                .cloned()
                .collect(),
        ))
    }

    async fn list_all(&self) -> AppResult<Vec<ShareToken>> {
        let state = self.state.lock().await;
        Ok(newest_first(state.shares.values().cloned().collect()))
    }
}
