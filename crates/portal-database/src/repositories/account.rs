//! PostgreSQL [`AccountStore`] composed from the user and access code
//! repositories.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use portal_core::result::AppResult;
use portal_entity::access_code::AccessCode;
use portal_entity::user::UserAccount;

use super::access_code::AccessCodeRepository;
use super::user::UserRepository;
use crate::store::AccountStore;

/// Principal lookup backed by `users` and `access_codes`.
#[derive(Debug, Clone)]
pub struct PgAccountStore {
    users: UserRepository,
    codes: AccessCodeRepository,
}

impl PgAccountStore {
    /// Create a new account store.
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            codes: AccessCodeRepository::new(pool),
        }
    }

    /// The underlying user repository.
    pub fn users(&self) -> &UserRepository {
        &self.users
    }

    /// The underlying access code repository.
    pub fn codes(&self) -> &AccessCodeRepository {
        &self.codes
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_active_user_by_username(
        &self,
        username: &str,
    ) -> AppResult<Option<UserAccount>> {
        self.users.find_active_by_username(username).await
    }

    async fn find_user_by_id(&self, id: Uuid) -> AppResult<Option<UserAccount>> {
        self.users.find_by_id(id).await
    }

    async fn update_password_hash(&self, user_id: Uuid, password_hash: &str) -> AppResult<bool> {
        self.users.update_password(user_id, password_hash).await
    }

    async fn touch_last_login(&self, user_id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        self.users.update_last_login(user_id, at).await
    }

    async fn find_active_code(&self, code: &str) -> AppResult<Option<AccessCode>> {
        self.codes.find_active_by_code(code).await
    }

    async fn find_code_by_id(&self, id: Uuid) -> AppResult<Option<AccessCode>> {
        self.codes.find_by_id(id).await
    }

    async fn redeem_access_code(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Option<AccessCode>> {
        self.codes.redeem(id, now).await
    }

    async fn deactivate_expired_codes(&self, now: DateTime<Utc>) -> AppResult<u64> {
        self.codes.deactivate_expired(now).await
    }
}
