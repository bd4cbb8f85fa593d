//! Username/password and access-code authentication.

use std::net::IpAddr;
use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use portal_core::error::AppError;
use portal_core::result::AppResult;
use portal_database::store::AccountStore;
use portal_entity::access_code::AccessCode;
use portal_entity::principal::Principal;
use portal_entity::user::UserAccount;

use crate::password::PasswordHasher;

use super::rate_limiter::RateLimiter;

/// Credentials presented at login.
#[derive(Clone)]
pub enum Credential {
    /// Account login.
    Password {
        /// Login name.
        username: String,
        /// Plaintext password.
        password: String,
    },
    /// Access-code login.
    AccessCode {
        /// The code secret.
        code: String,
    },
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .finish_non_exhaustive(),
            Self::AccessCode { .. } => f.debug_struct("AccessCode").finish_non_exhaustive(),
        }
    }
}

/// Verifies credentials and yields the authenticated principal.
///
/// Every path runs rate check, credential check, expiry check. A lockout
/// refuses before the credential is looked at and is not itself recorded
/// as a failed attempt.
#[derive(Debug, Clone)]
pub struct Authenticator {
    /// Principal lookup.
    accounts: Arc<dyn AccountStore>,
    /// Lockout tracking.
    limiter: RateLimiter,
    /// Password hasher.
    hasher: PasswordHasher,
}

impl Authenticator {
    /// Creates a new authenticator.
    pub fn new(accounts: Arc<dyn AccountStore>, limiter: RateLimiter) -> Self {
        Self {
            accounts,
            limiter,
            hasher: PasswordHasher::new(),
        }
    }

    /// The rate limiter in use.
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Authenticate one login request from `client`.
    pub async fn authenticate(&self, credential: &Credential, client: IpAddr) -> AppResult<Principal> {
        match credential {
            Credential::Password { username, password } => self
                .login_with_password(username, password, client)
                .await
                .map(Principal::User),
            Credential::AccessCode { code } => self
                .login_with_code(code, client)
                .await
                .map(Principal::AccessCode),
        }
    }

    async fn login_with_password(
        &self,
        username: &str,
        password: &str,
        client: IpAddr,
    ) -> AppResult<UserAccount> {
        let identifier = RateLimiter::user_identifier(username, client);

        if self.limiter.is_locked(&identifier).await? {
            return Err(AppError::rate_limited(format!(
                "Too many failed attempts for '{identifier}'"
            )));
        }

        let user = self.accounts.find_active_user_by_username(username).await?;
        let verified = match &user {
            Some(user) => self
                .hasher
                .verify_password(password, &user.password_hash)
                .unwrap_or_else(|e| {
                    error!(user_id = %user.id, error = %e, "Stored password hash is unusable");
                    false
                }),
            None => self.hasher.verify_dummy(password),
        };

        let user = match user {
            Some(user) if verified => user,
            _ => {
                self.limiter.record_attempt(&identifier, false).await?;
                warn!(identifier = %identifier, "Login rejected: invalid credentials");
                return Err(AppError::invalid_credentials(format!(
                    "Invalid credentials for '{username}'"
                )));
            }
        };

        let now = Utc::now();
        if user.is_expired_at(now) {
            self.limiter.record_attempt(&identifier, false).await?;
            warn!(user_id = %user.id, identifier = %identifier, "Login rejected: account expired");
            return Err(AppError::account_expired(format!(
                "Temporary account '{username}' expired"
            )));
        }

        if let Err(e) = self.accounts.touch_last_login(user.id, now).await {
            warn!(user_id = %user.id, error = %e, "Failed to update last login");
        }
        self.limiter.record_attempt(&identifier, true).await?;

        info!(user_id = %user.id, username = %user.username, role = %user.role, "User logged in");
        Ok(user)
    }

    async fn login_with_code(&self, code: &str, client: IpAddr) -> AppResult<AccessCode> {
        let identifier = RateLimiter::code_identifier(client);

        if self.limiter.is_locked(&identifier).await? {
            return Err(AppError::rate_limited(format!(
                "Too many failed attempts for '{identifier}'"
            )));
        }

        let now = Utc::now();
        if let Err(e) = self.accounts.deactivate_expired_codes(now).await {
            warn!(error = %e, "Failed to deactivate expired access codes");
        }

        let Some(found) = self.accounts.find_active_code(code).await? else {
            self.limiter.record_attempt(&identifier, false).await?;
            warn!(identifier = %identifier, "Login rejected: unknown access code");
            return Err(AppError::invalid_credentials("Unknown or inactive access code"));
        };

        if found.is_expired_at(now) {
            self.limiter.record_attempt(&identifier, false).await?;
            warn!(code_id = %found.id, "Login rejected: access code expired");
            return Err(AppError::account_expired("Access code expired"));
        }

        // The conditional increment is the only uses check that counts;
        // a prior read could be stale under concurrent logins.
        let Some(redeemed) = self.accounts.redeem_access_code(found.id, now).await? else {
            self.limiter.record_attempt(&identifier, false).await?;
            warn!(code_id = %found.id, "Login rejected: access code exhausted");
            return Err(AppError::code_exhausted(format!(
                "Access code {} has no remaining uses",
                found.label()
            )));
        };

        self.limiter.record_attempt(&identifier, true).await?;
        info!(
            code_id = %redeemed.id,
            uses = redeemed.current_uses,
            max_uses = redeemed.max_uses,
            "Access code login"
        );
        Ok(redeemed)
    }
}
