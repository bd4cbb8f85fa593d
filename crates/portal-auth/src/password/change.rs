//! Self-service password change for signed-in accounts.

use std::sync::Arc;

use tracing::{error, info, warn};

use portal_core::config::AuthConfig;
use portal_core::error::AppError;
use portal_core::result::AppResult;
use portal_database::store::AccountStore;
use portal_entity::principal::PrincipalRef;

use super::hasher::PasswordHasher;
use super::validator::PasswordValidator;

/// A password change form.
#[derive(Clone)]
pub struct PasswordChange {
    /// Password the account signs in with today.
    pub current: String,
    /// Replacement password.
    pub new: String,
    /// Replacement typed a second time.
    pub confirm: String,
}

impl std::fmt::Debug for PasswordChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordChange").finish_non_exhaustive()
    }
}

/// Replaces an account's password after re-checking the current one.
#[derive(Debug, Clone)]
pub struct PasswordService {
    accounts: Arc<dyn AccountStore>,
    hasher: PasswordHasher,
    validator: PasswordValidator,
}

impl PasswordService {
    /// Creates a password service.
    pub fn new(accounts: Arc<dyn AccountStore>, config: &AuthConfig) -> Self {
        Self {
            accounts,
            hasher: PasswordHasher::new(),
            validator: PasswordValidator::new(config),
        }
    }

    /// Change the password of the signed-in account.
    ///
    /// Access codes have no password and are refused. A wrong current
    /// password yields `InvalidPassword` and leaves the stored hash alone.
    pub async fn change_password(
        &self,
        principal: &PrincipalRef,
        change: &PasswordChange,
    ) -> AppResult<()> {
        let Some(user_id) = principal.user_id() else {
            return Err(AppError::permission_denied(
                "Access codes cannot change passwords",
            ));
        };

        if change.current.is_empty() || change.new.is_empty() || change.confirm.is_empty() {
            return Err(AppError::validation("All fields are required."));
        }
        if change.new != change.confirm {
            return Err(AppError::validation("New passwords do not match."));
        }

        let user = self
            .accounts
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;

        self.validator.validate(&user.username, &change.new)?;

        let verified = self
            .hasher
            .verify_password(&change.current, &user.password_hash)
            .unwrap_or_else(|e| {
                error!(user_id = %user_id, error = %e, "Stored password hash is unusable");
                false
            });
        if !verified {
            warn!(user_id = %user_id, "Password change rejected: current password mismatch");
            return Err(AppError::invalid_password("Current password is incorrect."));
        }

        let hash = self.hasher.hash_password(&change.new)?;
        if !self.accounts.update_password_hash(user_id, &hash).await? {
            return Err(AppError::not_found(format!("User {user_id} not found")));
        }

        info!(user_id = %user_id, username = %user.username, "Password changed");
        Ok(())
    }
}
