//! Scoped quota charge.

use std::sync::Arc;

use tracing::{error, warn};

use portal_core::result::AppResult;
use portal_database::store::QuotaStore;
use portal_entity::quota::QuotaOwner;

/// Bytes charged against a quota that are released unless committed.
///
/// Dropping an uncommitted charge (for example when the request future is
/// cancelled) schedules the release on the current Tokio runtime.
#[must_use = "an uncommitted charge is released when dropped"]
#[derive(Debug)]
pub struct QuotaCharge {
    store: Arc<dyn QuotaStore>,
    owner: QuotaOwner,
    bytes: i64,
    armed: bool,
}

impl QuotaCharge {
    pub(crate) fn new(store: Arc<dyn QuotaStore>, owner: QuotaOwner, bytes: i64) -> Self {
        Self {
            store,
            owner,
            bytes,
            armed: true,
        }
    }

    /// Charged bytes.
    pub fn bytes(&self) -> i64 {
        self.bytes
    }

    /// Whose quota was charged.
    pub fn owner(&self) -> QuotaOwner {
        self.owner
    }

    /// Keep the charge.
    pub fn commit(mut self) {
        self.armed = false;
    }

    /// Release the charge now.
    pub async fn rollback(mut self) -> AppResult<()> {
        self.armed = false;
        self.store.release(self.owner, self.bytes).await
    }
}

impl Drop for QuotaCharge {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let store = self.store.clone();
        let owner = self.owner;
        let bytes = self.bytes;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                warn!(owner = ?owner, bytes = bytes, "Releasing uncommitted quota charge");
                handle.spawn(async move {
                    if let Err(e) = store.release(owner, bytes).await {
                        error!(owner = ?owner, bytes = bytes, error = %e, "Failed to release quota");
                    }
                });
            }
            Err(_) => {
                error!(
                    owner = ?owner,
                    bytes = bytes,
                    "Uncommitted quota charge dropped outside a runtime; bytes stay charged"
                );
            }
        }
    }
}
