//! Session lifetime configuration.

use serde::{Deserialize, Serialize};

/// Session lifetime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Absolute lifetime of an authenticated session, measured from login.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Idle timeout measured from the last successful check. `0` disables it.
    #[serde(default)]
    pub idle_timeout_seconds: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            idle_timeout_seconds: 0,
        }
    }
}

fn default_timeout() -> u64 {
    3600
}
