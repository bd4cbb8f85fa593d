//! PostgreSQL connection pool management.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use portal_core::config::DatabaseConfig;
use portal_core::error::{AppError, ErrorKind};

use crate::repositories::{
    FileRepository, LoginAttemptRepository, PgAccountStore, QuotaRepository, ShareRepository,
};
use crate::store::{AccountStore, FileCatalog, LoginAttemptStore, QuotaStore, ShareStore};

/// Store handles backed by one PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgStores {
    /// Concrete account store, also used for operator CRUD.
    pub accounts: PgAccountStore,
    /// Login attempt log.
    pub attempts: Arc<dyn LoginAttemptStore>,
    /// Share tokens.
    pub shares: Arc<dyn ShareStore>,
    /// Quota counters.
    pub quota: Arc<dyn QuotaStore>,
    /// File metadata.
    pub files: Arc<dyn FileCatalog>,
}

impl PgStores {
    /// The account store as a trait object.
    pub fn account_store(&self) -> Arc<dyn AccountStore> {
        Arc::new(self.accounts.clone())
    }
}

/// Wrapper around the sqlx PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    /// The underlying sqlx connection pool.
    pool: PgPool,
}

impl DatabasePool {
    /// Create a new database pool from configuration.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        info!(
            url = %mask_password(&config.url),
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect(&config.url)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::StorageFailure,
                    format!("Failed to connect to database: {e}"),
                    e,
                )
            })?;

        info!("Successfully connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// Return a reference to the underlying sqlx pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Build every store on top of this pool.
    pub fn stores(&self) -> PgStores {
        PgStores {
            accounts: PgAccountStore::new(self.pool.clone()),
            attempts: Arc::new(LoginAttemptRepository::new(self.pool.clone())),
            shares: Arc::new(ShareRepository::new(self.pool.clone())),
            quota: Arc::new(QuotaRepository::new(self.pool.clone())),
            files: Arc::new(FileRepository::new(self.pool.clone())),
        }
    }

    /// Check database connectivity.
    pub async fn health_check(&self) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| AppError::with_source(ErrorKind::StorageFailure, "Health check failed", e))
    }

    /// Close all connections in the pool.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }
}

/// Mask the password portion of a database URL for safe logging.
fn mask_password(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        if let Some(colon_pos) = url[..at_pos].rfind(':') {
            let scheme_end = url.find("://").map(|p| p + 3).unwrap_or(0);
            if colon_pos > scheme_end {
                return format!("{}:****@{}", &url[..colon_pos], &url[at_pos + 1..]);
            }
        }
    }
    url.to_string()
}
