//! Session state machine: login binding, timeouts, CSRF and logout.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use portal_core::config::SessionConfig;
use portal_core::error::AppError;
use portal_core::result::AppResult;
use portal_entity::principal::PrincipalRef;

use super::csrf;
use super::state::{ExpiryReason, Session, SessionStatus};

/// Applies lifetime rules to [`Session`] values.
#[derive(Debug, Clone)]
pub struct SessionManager {
    /// Absolute lifetime from login.
    timeout: Duration,
    /// Idle lifetime from last activity. `None` when disabled.
    idle_timeout: Option<Duration>,
}

impl SessionManager {
    /// Creates a manager from session configuration.
    pub fn new(config: &SessionConfig) -> AppResult<Self> {
        let timeout = seconds(config.timeout_seconds, "session.timeout_seconds")?;
        let idle_timeout = match config.idle_timeout_seconds {
            0 => None,
            secs => Some(seconds(secs, "session.idle_timeout_seconds")?),
        };
        Ok(Self {
            timeout,
            idle_timeout,
        })
    }

    /// Bind `principal` to the session.
    ///
    /// Any CSRF token minted before login is discarded.
    pub fn establish(&self, session: &mut Session, principal: PrincipalRef) {
        self.establish_at(session, principal, Utc::now());
    }

    /// [`establish`](Self::establish) with an explicit clock.
    pub fn establish_at(&self, session: &mut Session, principal: PrincipalRef, now: DateTime<Utc>) {
        info!(
            principal_id = %principal.id,
            label = %principal.label,
            role = %principal.role,
            "Session established"
        );
        session.principal = Some(principal);
        session.login_time = Some(now);
        session.last_activity = Some(now);
        session.csrf_token = None;
    }

    /// Evaluate the session, clearing it when a timeout has fired.
    pub fn check(&self, session: &mut Session) -> SessionStatus {
        self.check_at(session, Utc::now())
    }

    /// [`check`](Self::check) with an explicit clock.
    pub fn check_at(&self, session: &mut Session, now: DateTime<Utc>) -> SessionStatus {
        let (Some(principal), Some(login_time)) = (&session.principal, session.login_time) else {
            return SessionStatus::Anonymous;
        };

        let reason = if now - login_time > self.timeout {
            Some(ExpiryReason::Absolute)
        } else {
            match (self.idle_timeout, session.last_activity) {
                (Some(idle), Some(last)) if now - last > idle => Some(ExpiryReason::Idle),
                _ => None,
            }
        };

        if let Some(reason) = reason {
            warn!(principal_id = %principal.id, reason = ?reason, "Session expired");
            session.clear();
            return SessionStatus::Expired { reason };
        }

        let principal = principal.clone();
        session.last_activity = Some(now);
        SessionStatus::Active(principal)
    }

    /// Whether the session holds a live principal.
    pub fn is_authenticated(&self, session: &mut Session) -> bool {
        matches!(self.check(session), SessionStatus::Active(_))
    }

    /// The session's CSRF token, minting one if none is outstanding.
    pub fn csrf_token(&self, session: &mut Session) -> String {
        session
            .csrf_token
            .get_or_insert_with(csrf::generate_token)
            .clone()
    }

    /// Verify a submitted token. A match consumes it.
    pub fn verify_csrf(&self, session: &mut Session, candidate: &str) -> bool {
        let matched = session
            .csrf_token
            .as_deref()
            .is_some_and(|expected| csrf::tokens_match(expected, candidate));
        if matched {
            session.csrf_token = None;
        } else {
            debug!("CSRF token mismatch");
        }
        matched
    }

    /// Clear the session unconditionally.
    pub fn logout(&self, session: &mut Session) {
        if let Some(principal) = &session.principal {
            info!(principal_id = %principal.id, "Session logged out");
        }
        session.clear();
    }
}

fn seconds(value: u64, key: &str) -> AppResult<Duration> {
    i64::try_from(value)
        .ok()
        .and_then(Duration::try_seconds)
        .ok_or_else(|| AppError::configuration(format!("{key} is out of range")))
}
