//! Periodic cleanup commands.

use chrono::Utc;
use clap::{Args, Subcommand};
use tracing::info;

use portal_auth::login::RateLimiter;
use portal_core::config::AppConfig;
use portal_core::error::AppError;
use portal_database::DatabasePool;
use portal_database::store::AccountStore;

use crate::output;

/// Arguments for maintenance commands
#[derive(Debug, Args)]
pub struct MaintenanceArgs {
    /// Maintenance subcommand
    #[command(subcommand)]
    pub command: MaintenanceCommand,
}

/// Maintenance subcommands
#[derive(Debug, Subcommand)]
pub enum MaintenanceCommand {
    /// Prune old login attempts and deactivate expired access codes
    Sweep,
}

/// Execute maintenance commands
pub async fn execute(
    args: &MaintenanceArgs,
    db: &DatabasePool,
    config: &AppConfig,
) -> Result<(), AppError> {
    match &args.command {
        MaintenanceCommand::Sweep => {
            let stores = db.stores();
            let pruned = RateLimiter::new(stores.attempts.clone(), &config.auth)?
                .prune()
                .await;
            let expired = stores
                .account_store()
                .deactivate_expired_codes(Utc::now())
                .await?;

            info!(pruned_attempts = pruned, expired_codes = expired, "Sweep finished");
            output::print_success("Sweep finished");
            output::print_kv("Login attempts pruned", &pruned.to_string());
            output::print_kv("Access codes expired", &expired.to_string());
        }
    }

    Ok(())
}
