//! Session value and status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use portal_entity::principal::PrincipalRef;

/// Everything the portal keeps per browser session.
///
/// The transport layer persists this value however it likes (cookie store,
/// server-side map) and hands it to [`SessionManager`](super::SessionManager)
/// by mutable reference on each request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bound principal, if logged in.
    pub principal: Option<PrincipalRef>,
    /// When the principal was bound.
    pub login_time: Option<DateTime<Utc>>,
    /// Last successful authentication check.
    pub last_activity: Option<DateTime<Utc>>,
    /// Outstanding single-use CSRF token.
    pub csrf_token: Option<String>,
}

impl Session {
    /// A fresh anonymous session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every field.
    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Why an authenticated session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryReason {
    /// Absolute lifetime since login exceeded.
    Absolute,
    /// No activity within the idle timeout.
    Idle,
}

/// Result of checking a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// A principal is bound and within its lifetime.
    Active(PrincipalRef),
    /// No principal is bound.
    Anonymous,
    /// A principal was bound but timed out; the session has been cleared.
    Expired {
        /// Which timeout fired.
        reason: ExpiryReason,
    },
}

impl SessionStatus {
    /// The active principal, if any.
    pub fn principal(&self) -> Option<&PrincipalRef> {
        match self {
            Self::Active(principal) => Some(principal),
            _ => None,
        }
    }
}
