//! Share token entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::principal::ResourceOwner;

/// A capability granting anonymous download of one file.
///
/// The share references the file by id only. A share whose file has been
/// removed is treated as not found by the validation path.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ShareToken {
    /// Unique share identifier.
    pub id: Uuid,
    /// The shared file.
    pub file_id: Uuid,
    /// Account that created the share.
    #[sqlx(rename = "shared_by_user")]
    pub owner_user_id: Uuid,
    /// 64 hex characters of OS randomness.
    #[sqlx(rename = "share_token")]
    pub token: String,
    /// Whether the share appears in the public listing.
    pub is_public: bool,
    /// Argon2 hash of the optional download password.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    /// When the share stops working.
    pub expires_at: Option<DateTime<Utc>>,
    /// Download cap (None = unlimited).
    pub max_downloads: Option<i32>,
    /// Downloads so far. Never exceeds `max_downloads`.
    pub download_count: i32,
    /// Cleared by deactivation.
    pub is_active: bool,
    /// When the share was created.
    pub created_at: DateTime<Utc>,
}

impl ShareToken {
    /// Whether the share is past its expiry time at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires| expires < now)
    }

    /// Whether the download cap has been reached.
    pub fn limit_reached(&self) -> bool {
        self.max_downloads
            .is_some_and(|max| self.download_count >= max)
    }

    /// Whether a password must be supplied to download.
    pub fn is_password_protected(&self) -> bool {
        self.password_hash.as_deref().is_some_and(|h| !h.is_empty())
    }

    /// Ownership columns for RBAC checks.
    pub fn owner(&self) -> ResourceOwner {
        ResourceOwner::user(self.owner_user_id)
    }

    /// Whether the share belongs in the anonymous public listing at `now`.
    pub fn is_publicly_listed_at(&self, now: DateTime<Utc>) -> bool {
        self.is_public
            && self.is_active
            && !self.is_password_protected()
            && !self.is_expired_at(now)
            && !self.limit_reached()
    }
}

/// Data required to persist a new share.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewShareToken {
    /// The shared file.
    pub file_id: Uuid,
    /// Creating account.
    pub owner_user_id: Uuid,
    /// Freshly generated token.
    pub token: String,
    /// Public listing flag.
    pub is_public: bool,
    /// Password hash, if protected.
    pub password_hash: Option<String>,
    /// Optional expiry.
    pub expires_at: Option<DateTime<Utc>>,
    /// Optional download cap.
    pub max_downloads: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn share() -> ShareToken {
        ShareToken {
            id: Uuid::new_v4(),
            file_id: Uuid::new_v4(),
            owner_user_id: Uuid::new_v4(),
            token: "ab".repeat(32),
            is_public: true,
            password_hash: None,
            expires_at: None,
            max_downloads: None,
            download_count: 0,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_public_listing_rules() {
        let now = Utc::now();
        assert!(share().is_publicly_listed_at(now));

        let mut protected = share();
        protected.password_hash = Some("$argon2id$...".to_string());
        assert!(!protected.is_publicly_listed_at(now));

        let mut expired = share();
        expired.expires_at = Some(now - Duration::seconds(1));
        assert!(!expired.is_publicly_listed_at(now));

        let mut spent = share();
        spent.max_downloads = Some(3);
        spent.download_count = 3;
        assert!(spent.limit_reached());
        assert!(!spent.is_publicly_listed_at(now));
    }

    #[test]
    fn test_empty_hash_is_not_protected() {
        let mut s = share();
        s.password_hash = Some(String::new());
        assert!(!s.is_password_protected());
    }
}
