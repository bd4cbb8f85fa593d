//! Public share link configuration.

use serde::{Deserialize, Serialize};

/// Settings used to build public share URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareConfig {
    /// Scheme and host the portal is served from, without trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Path of the anonymous download page.
    #[serde(default = "default_public_path")]
    pub public_path: String,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            public_path: default_public_path(),
        }
    }
}

impl ShareConfig {
    /// Build the public URL for a share token.
    pub fn link_for(&self, token: &str) -> String {
        format!(
            "{}{}?token={}",
            self.base_url.trim_end_matches('/'),
            self.public_path,
            token
        )
    }
}

fn default_base_url() -> String {
    "http://localhost".to_string()
}

fn default_public_path() -> String {
    "/s".to_string()
}
