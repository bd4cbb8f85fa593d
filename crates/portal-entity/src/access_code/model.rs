//! Access code entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A bearer secret that grants a limited number of logins without an account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AccessCode {
    /// Unique code identifier.
    pub id: Uuid,
    /// The opaque secret typed in at login.
    pub code: String,
    /// Maximum number of successful logins.
    pub max_uses: i32,
    /// Successful logins so far. Never exceeds `max_uses`.
    pub current_uses: i32,
    /// Upload quota in bytes.
    pub upload_quota: i64,
    /// Bytes currently charged against the quota.
    pub used_quota: i64,
    /// The code stops working after this time.
    pub expiry_date: Option<DateTime<Utc>>,
    /// Whether the code may be used.
    pub is_active: bool,
    /// The admin who issued the code.
    pub created_by: Option<Uuid>,
    /// When the code was created.
    pub created_at: DateTime<Utc>,
}

impl AccessCode {
    /// Whether the code has passed its expiry date at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date.is_some_and(|expiry| expiry < now)
    }

    /// Whether every allowed use has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.current_uses >= self.max_uses
    }

    /// Remaining logins.
    pub fn remaining_uses(&self) -> i32 {
        (self.max_uses - self.current_uses).max(0)
    }

    /// Display label used in sessions and logs. Never the secret itself.
    pub fn label(&self) -> String {
        let short = self.id.simple().to_string();
        format!("code-{}", &short[..8])
    }
}

/// Data required to issue a new access code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccessCode {
    /// The secret.
    pub code: String,
    /// Maximum number of logins.
    pub max_uses: i32,
    /// Upload quota in bytes.
    pub upload_quota: i64,
    /// Optional expiry.
    pub expiry_date: Option<DateTime<Utc>>,
    /// Issuing admin.
    pub created_by: Option<Uuid>,
}
