//! Quota value objects.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::principal::{PrincipalKind, PrincipalRef};

/// Whose quota counter is being charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum QuotaOwner {
    /// `users.used_quota`.
    User(Uuid),
    /// `access_codes.used_quota`.
    AccessCode(Uuid),
}

impl From<&PrincipalRef> for QuotaOwner {
    fn from(principal: &PrincipalRef) -> Self {
        match principal.kind {
            PrincipalKind::User => Self::User(principal.id),
            PrincipalKind::AccessCode => Self::AccessCode(principal.id),
        }
    }
}

/// Quota snapshot for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotaUsage {
    /// Total quota in bytes.
    pub total_bytes: i64,
    /// Currently used bytes.
    pub used_bytes: i64,
    /// Available bytes (never negative).
    pub available_bytes: i64,
    /// Usage percentage (0.0 - 100.0).
    pub usage_percent: f64,
}

impl QuotaUsage {
    /// Create a usage snapshot from total and used values.
    pub fn new(total_bytes: i64, used_bytes: i64) -> Self {
        let available_bytes = (total_bytes - used_bytes).max(0);
        let usage_percent = if total_bytes <= 0 {
            0.0
        } else {
            ((used_bytes as f64 / total_bytes as f64) * 100.0).min(100.0)
        };

        Self {
            total_bytes,
            used_bytes,
            available_bytes,
            usage_percent,
        }
    }

    /// Check if adding the given number of bytes stays within the quota.
    pub fn can_accept(&self, incoming_bytes: i64) -> bool {
        self.used_bytes.saturating_add(incoming_bytes) <= self.total_bytes
    }
}
