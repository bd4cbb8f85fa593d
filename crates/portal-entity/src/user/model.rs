//! User account entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::role::Role;

/// A registered account.
///
/// The persisted row also carries a legacy `is_admin` flag; the database
/// layer folds it into [`Role`] on read so this struct has one source of
/// truth for privilege.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    /// Unique user identifier.
    pub id: Uuid,
    /// Unique login name.
    pub username: String,
    /// Email address (optional).
    pub email: Option<String>,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Assigned role.
    pub role: Role,
    /// Upload quota in bytes.
    pub upload_quota: i64,
    /// Bytes currently charged against the quota.
    pub used_quota: i64,
    /// Temporary accounts stop working after `expiry_date`.
    pub is_temporary: bool,
    /// Expiry of a temporary account.
    pub expiry_date: Option<DateTime<Utc>>,
    /// Whether the account may log in.
    pub is_active: bool,
    /// Last successful login time.
    pub last_login: Option<DateTime<Utc>>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    /// Whether a temporary account has passed its expiry date at `now`.
    ///
    /// Permanent accounts never expire, even if a date is recorded.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.is_temporary && self.expiry_date.is_some_and(|expiry| expiry < now)
    }

    /// Check if this account has admin privileges.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Data required to create a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Desired username.
    pub username: String,
    /// Email address (optional).
    pub email: Option<String>,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Assigned role.
    pub role: Role,
    /// Upload quota in bytes.
    pub upload_quota: i64,
    /// Whether the account is temporary.
    pub is_temporary: bool,
    /// Expiry of a temporary account.
    pub expiry_date: Option<DateTime<Utc>>,
}
