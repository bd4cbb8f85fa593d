//! Login attempt log.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use portal_core::result::AppResult;
use portal_entity::attempt::LoginAttempt;

/// Append-only attempt history backing the rate limiter.
#[async_trait]
pub trait LoginAttemptStore: Send + Sync + std::fmt::Debug {
    /// Append one attempt.
    async fn append(&self, attempt: &LoginAttempt) -> AppResult<()>;

    /// Count failed attempts for `identifier` strictly after `since`.
    async fn count_failed_since(&self, identifier: &str, since: DateTime<Utc>) -> AppResult<u64>;

    /// Delete every failed attempt for `identifier`.
    async fn clear_failed(&self, identifier: &str) -> AppResult<u64>;

    /// Delete every attempt recorded before `cutoff`.
    async fn prune_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64>;
}
