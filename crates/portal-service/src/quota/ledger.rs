//! Quota checks, charges and releases.

use std::sync::Arc;

use tracing::info;

use portal_core::error::AppError;
use portal_core::result::AppResult;
use portal_database::store::QuotaStore;
use portal_entity::quota::{QuotaOwner, QuotaUsage};

use super::guard::QuotaCharge;

/// Tracks used/total bytes per principal.
#[derive(Debug, Clone)]
pub struct QuotaLedger {
    /// Quota counters.
    store: Arc<dyn QuotaStore>,
}

impl QuotaLedger {
    /// Creates a new ledger.
    pub fn new(store: Arc<dyn QuotaStore>) -> Self {
        Self { store }
    }

    /// Current usage.
    pub async fn usage(&self, owner: QuotaOwner) -> AppResult<QuotaUsage> {
        self.store
            .usage(owner)
            .await?
            .ok_or_else(|| AppError::not_found(format!("No quota record for {owner:?}")))
    }

    /// Whether `incoming_bytes` would fit right now.
    ///
    /// Advisory only; [`charge`](Self::charge) re-checks atomically.
    pub async fn can_accept(&self, owner: QuotaOwner, incoming_bytes: i64) -> AppResult<bool> {
        Ok(self.usage(owner).await?.can_accept(incoming_bytes))
    }

    /// Charge `bytes` in one conditional update.
    pub async fn charge(&self, owner: QuotaOwner, bytes: i64) -> AppResult<QuotaUsage> {
        if bytes < 0 {
            return Err(AppError::validation("Cannot charge a negative byte count"));
        }
        match self.store.try_charge(owner, bytes).await? {
            Some(usage) => {
                info!(owner = ?owner, bytes = bytes, used = usage.used_bytes, "Quota charged");
                Ok(usage)
            }
            None => {
                let usage = self.usage(owner).await?;
                Err(AppError::quota_exceeded(format!(
                    "Charging {bytes} bytes would exceed quota ({} of {} used)",
                    usage.used_bytes, usage.total_bytes
                )))
            }
        }
    }

    /// Give `bytes` back, saturating at zero.
    pub async fn release(&self, owner: QuotaOwner, bytes: i64) -> AppResult<()> {
        if bytes <= 0 {
            return Ok(());
        }
        self.store.release(owner, bytes).await?;
        info!(owner = ?owner, bytes = bytes, "Quota released");
        Ok(())
    }

    /// Charge `bytes` and hand back a guard that releases them unless
    /// committed.
    pub async fn reserve(&self, owner: QuotaOwner, bytes: i64) -> AppResult<QuotaCharge> {
        self.charge(owner, bytes).await?;
        Ok(QuotaCharge::new(self.store.clone(), owner, bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_core::error::ErrorKind;
    use portal_database::MemoryStore;
    use portal_entity::user::{CreateUser, Role};

    async fn alice(store: &MemoryStore) -> QuotaOwner {
        let user = store
            .create_user(&CreateUser {
                username: "alice".to_string(),
                email: None,
                password_hash: String::new(),
                role: Role::User,
                upload_quota: 1000,
                is_temporary: false,
                expiry_date: None,
            })
            .await
            .unwrap();
        let owner = QuotaOwner::User(user.id);
        store.set_used_quota(owner, 900).await;
        owner
    }

    #[tokio::test]
    async fn test_alice_quota_scenario() {
        let store = MemoryStore::new();
        let owner = alice(&store).await;
        let ledger = QuotaLedger::new(Arc::new(store.clone()));

        assert!(!ledger.can_accept(owner, 150).await.unwrap());
        let err = ledger.charge(owner, 150).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::QuotaExceeded);
        assert_eq!(ledger.usage(owner).await.unwrap().used_bytes, 900);

        let usage = ledger.charge(owner, 100).await.unwrap();
        assert_eq!(usage.used_bytes, 1000);
        assert_eq!(usage.available_bytes, 0);
    }

    #[tokio::test]
    async fn test_release_clamps_at_zero() {
        let store = MemoryStore::new();
        let owner = alice(&store).await;
        let ledger = QuotaLedger::new(Arc::new(store));

        ledger.release(owner, 10_000).await.unwrap();
        assert_eq!(ledger.usage(owner).await.unwrap().used_bytes, 0);
    }

    #[tokio::test]
    async fn test_unknown_owner_is_not_found() {
        let ledger = QuotaLedger::new(Arc::new(MemoryStore::new()));
        let err = ledger
            .charge(QuotaOwner::AccessCode(uuid::Uuid::new_v4()), 1)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
