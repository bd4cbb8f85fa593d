//! Share link token generation and URL building.

use rand::RngCore;
use rand::rngs::OsRng;

use portal_core::config::ShareConfig;
use portal_entity::share::{ShareLink, ShareToken};

/// Bytes of OS randomness behind each token.
pub const TOKEN_BYTES: usize = 32;

/// Generates share link tokens and the URLs that carry them.
#[derive(Debug, Clone)]
pub struct LinkService {
    /// Base URL and public path.
    config: ShareConfig,
}

impl LinkService {
    /// Creates a new link service.
    pub fn new(config: ShareConfig) -> Self {
        Self { config }
    }

    /// 64 lowercase hex characters drawn from the OS CSPRNG.
    pub fn generate_token(&self) -> String {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    /// Public link for a persisted share.
    pub fn link_for(&self, share: &ShareToken) -> ShareLink {
        ShareLink {
            share_id: share.id,
            url: self.config.link_for(&share.token),
            token: share.token.clone(),
            is_password_protected: share.is_password_protected(),
            expires_at: share.expires_at,
            max_downloads: share.max_downloads,
        }
    }
}

impl Default for LinkService {
    fn default() -> Self {
        Self::new(ShareConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_token_shape() {
        let links = LinkService::default();
        let token = links.generate_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_tokens_do_not_repeat() {
        let links = LinkService::default();
        let tokens: HashSet<String> = (0..256).map(|_| links.generate_token()).collect();
        assert_eq!(tokens.len(), 256);
    }
}
