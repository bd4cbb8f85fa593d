//! Principal lookup.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use portal_core::result::AppResult;
use portal_entity::access_code::AccessCode;
use portal_entity::user::UserAccount;

/// Account and access-code persistence used during authentication.
#[async_trait]
pub trait AccountStore: Send + Sync + std::fmt::Debug {
    /// Find an active account by username.
    async fn find_active_user_by_username(&self, username: &str)
    -> AppResult<Option<UserAccount>>;

    /// Find an account by id regardless of state.
    async fn find_user_by_id(&self, id: Uuid) -> AppResult<Option<UserAccount>>;

    /// Replace an account's password hash. Returns whether the account exists.
    async fn update_password_hash(&self, user_id: Uuid, password_hash: &str) -> AppResult<bool>;

    /// Record a successful login.
    async fn touch_last_login(&self, user_id: Uuid, at: DateTime<Utc>) -> AppResult<()>;

    /// Find an active access code by its secret.
    async fn find_active_code(&self, code: &str) -> AppResult<Option<AccessCode>>;

    /// Find an access code by id regardless of state.
    async fn find_code_by_id(&self, id: Uuid) -> AppResult<Option<AccessCode>>;

    /// Consume one use of an access code.
    ///
    /// Increments `current_uses` only if the code is active, unexpired at
    /// `now` and below `max_uses`, and returns the updated row. Returns
    /// `None` when any of those conditions fails.
    async fn redeem_access_code(&self, id: Uuid, now: DateTime<Utc>)
    -> AppResult<Option<AccessCode>>;

    /// Deactivate every access code whose expiry date is before `now`.
    async fn deactivate_expired_codes(&self, now: DateTime<Utc>) -> AppResult<u64>;
}
