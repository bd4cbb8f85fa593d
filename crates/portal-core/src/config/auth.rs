//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Credential verification and brute-force mitigation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Failed attempts inside the lockout window that lock an identifier.
    #[serde(default = "default_max_attempts")]
    pub max_login_attempts: u32,
    /// Trailing window, in seconds, over which failed attempts are counted.
    #[serde(default = "default_lockout")]
    pub lockout_duration_seconds: u64,
    /// Attempt rows older than this are pruned.
    #[serde(default = "default_retention")]
    pub attempt_retention_hours: u64,
    /// Minimum password length for operator-created accounts.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            max_login_attempts: default_max_attempts(),
            lockout_duration_seconds: default_lockout(),
            attempt_retention_hours: default_retention(),
            password_min_length: default_password_min(),
        }
    }
}

fn default_max_attempts() -> u32 {
    5
}

fn default_lockout() -> u64 {
    900
}

fn default_retention() -> u64 {
    24
}

fn default_password_min() -> usize {
    8
}
