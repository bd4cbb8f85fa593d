//! Upload and quota configuration.

use serde::{Deserialize, Serialize};

/// Upload limits and quota defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Largest single payload accepted, in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size_bytes: i64,
    /// Quota assigned to new accounts and access codes, in bytes.
    #[serde(default = "default_quota")]
    pub default_quota_bytes: i64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: default_max_file_size(),
            default_quota_bytes: default_quota(),
        }
    }
}

fn default_max_file_size() -> i64 {
    10 * 1024 * 1024 * 1024
}

fn default_quota() -> i64 {
    1024 * 1024 * 1024
}
