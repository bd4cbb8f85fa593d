//! Failed-attempt counting and lockout windows.

use std::net::IpAddr;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};

use portal_core::config::AuthConfig;
use portal_core::error::AppError;
use portal_core::result::AppResult;
use portal_database::store::LoginAttemptStore;
use portal_entity::attempt::LoginAttempt;

/// Tracks failed authentication attempts per identifier.
///
/// Identifiers are `"{username}_{address}"` for password logins and
/// `"code_{address}"` for access-code logins, so code guessing is limited
/// per client address rather than per code.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    /// Attempt log.
    store: Arc<dyn LoginAttemptStore>,
    /// Failed attempts that trigger a lockout.
    max_attempts: u64,
    /// Trailing window over which failures are counted.
    window: Duration,
    /// Rows older than this are pruned on every check.
    retention: Duration,
}

impl RateLimiter {
    /// Creates a limiter from auth configuration.
    ///
    /// Fails with a configuration error when a duration does not fit in a
    /// [`chrono::Duration`].
    pub fn new(store: Arc<dyn LoginAttemptStore>, config: &AuthConfig) -> AppResult<Self> {
        let window = i64::try_from(config.lockout_duration_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .ok_or_else(|| {
                AppError::configuration("auth.lockout_duration_seconds is out of range")
            })?;
        let retention = i64::try_from(config.attempt_retention_hours)
            .ok()
            .and_then(Duration::try_hours)
            .ok_or_else(|| {
                AppError::configuration("auth.attempt_retention_hours is out of range")
            })?;
        Ok(Self {
            store,
            max_attempts: u64::from(config.max_login_attempts),
            window,
            retention,
        })
    }

    /// Identifier for a username/password login.
    pub fn user_identifier(username: &str, addr: IpAddr) -> String {
        format!("{username}_{addr}")
    }

    /// Identifier for an access-code login.
    pub fn code_identifier(addr: IpAddr) -> String {
        format!("code_{addr}")
    }

    /// Whether `identifier` is currently locked out.
    ///
    /// Prunes attempt rows past the retention window first; a failed prune
    /// is logged and ignored.
    pub async fn is_locked(&self, identifier: &str) -> AppResult<bool> {
        self.prune().await;
        let failures = self.failure_count(identifier).await?;
        let locked = failures >= self.max_attempts;
        if locked {
            warn!(identifier = %identifier, failures = failures, "Identifier is locked out");
        }
        Ok(locked)
    }

    /// Failed attempts for `identifier` inside the lockout window.
    pub async fn failure_count(&self, identifier: &str) -> AppResult<u64> {
        let since = Utc::now() - self.window;
        self.store.count_failed_since(identifier, since).await
    }

    /// Record the outcome of one attempt.
    ///
    /// A success is appended for audit and then wipes every failed row for
    /// the identifier.
    pub async fn record_attempt(&self, identifier: &str, succeeded: bool) -> AppResult<()> {
        self.store
            .append(&LoginAttempt {
                identifier: identifier.to_string(),
                attempt_time: Utc::now(),
                was_successful: succeeded,
            })
            .await?;

        if succeeded {
            let cleared = self.store.clear_failed(identifier).await?;
            if cleared > 0 {
                info!(identifier = %identifier, cleared = cleared, "Cleared failed attempts");
            }
        } else {
            debug!(identifier = %identifier, "Recorded failed attempt");
        }
        Ok(())
    }

    /// Delete attempt rows older than the retention window.
    pub async fn prune(&self) -> u64 {
        let cutoff = Utc::now() - self.retention;
        match self.store.prune_before(cutoff).await {
            Ok(pruned) => pruned,
            Err(e) => {
                warn!(error = %e, "Failed to prune login attempts");
                0
            }
        }
    }
}
