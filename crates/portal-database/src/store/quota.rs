//! Quota counters.

use async_trait::async_trait;

use portal_core::result::AppResult;
use portal_entity::quota::{QuotaOwner, QuotaUsage};

/// Per-principal byte counters.
#[async_trait]
pub trait QuotaStore: Send + Sync + std::fmt::Debug {
    /// Current usage, or `None` when the owner does not exist.
    async fn usage(&self, owner: QuotaOwner) -> AppResult<Option<QuotaUsage>>;

    /// Add `bytes` to the used counter if the result stays within the quota.
    ///
    /// Returns the new usage, or `None` when the charge was refused or the
    /// owner does not exist.
    async fn try_charge(&self, owner: QuotaOwner, bytes: i64) -> AppResult<Option<QuotaUsage>>;

    /// Subtract `bytes` from the used counter, saturating at zero.
    async fn release(&self, owner: QuotaOwner, bytes: i64) -> AppResult<()>;
}
