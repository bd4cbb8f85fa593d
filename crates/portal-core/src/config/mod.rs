//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every field has a serde default so an empty file still
//! yields a usable configuration.

pub mod auth;
pub mod database;
pub mod logging;
pub mod session;
pub mod share;
pub mod upload;

use serde::{Deserialize, Serialize};

pub use self::auth::AuthConfig;
pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::session::SessionConfig;
pub use self::share::ShareConfig;
pub use self::upload::UploadConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Authentication and brute-force mitigation settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Session lifetime settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Public share link settings.
    #[serde(default)]
    pub share: ShareConfig,
    /// Upload and quota settings.
    #[serde(default)]
    pub upload: UploadConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `PORTAL__`
    /// (e.g. `PORTAL__AUTH__MAX_LOGIN_ATTEMPTS=10`).
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("PORTAL")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_constants() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.auth.max_login_attempts, 5);
        assert_eq!(cfg.auth.lockout_duration_seconds, 900);
        assert_eq!(cfg.auth.attempt_retention_hours, 24);
        assert_eq!(cfg.session.timeout_seconds, 3600);
        assert_eq!(cfg.session.idle_timeout_seconds, 0);
        assert_eq!(cfg.upload.max_file_size_bytes, 10 * 1024 * 1024 * 1024);
        assert_eq!(cfg.upload.default_quota_bytes, 1024 * 1024 * 1024);
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let cfg: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(
                "[auth]\nmax_login_attempts = 3\n\n[share]\nbase_url = \"https://files.example.org\"\n",
                config::FileFormat::Toml,
            ))
            .build()
            .and_then(|c| c.try_deserialize())
            .expect("config should deserialize");

        assert_eq!(cfg.auth.max_login_attempts, 3);
        assert_eq!(cfg.auth.lockout_duration_seconds, 900);
        assert_eq!(cfg.share.base_url, "https://files.example.org");
        assert_eq!(cfg.share.public_path, "/s");
        assert_eq!(cfg.logging.level, "info");
    }
}
