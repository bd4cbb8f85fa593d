//! Login attempt entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One row of the append-only login attempt log.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LoginAttempt {
    /// `"{username}_{address}"` or `"code_{address}"`.
    pub identifier: String,
    /// When the attempt happened.
    pub attempt_time: DateTime<Utc>,
    /// Whether the attempt succeeded.
    pub was_successful: bool,
}
