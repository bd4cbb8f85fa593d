//! CLI command definitions and dispatch.

pub mod code;
pub mod maintenance;
pub mod migrate;
pub mod share;
pub mod user;

use clap::{Parser, Subcommand};

use portal_core::config::AppConfig;
use portal_core::error::AppError;
use portal_database::DatabasePool;

use crate::output::OutputFormat;

/// Secure Portal administration
#[derive(Debug, Parser)]
#[command(name = "portal", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment (loads config/<env>.toml over config/default.toml)
    #[arg(short, long, env = "PORTAL_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Account management
    User(user::UserArgs),
    /// Access code management
    Code(code::CodeArgs),
    /// Share link management
    Share(share::ShareArgs),
    /// Periodic cleanup
    Maintenance(maintenance::MaintenanceArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        let db = connect(config).await?;
        let result = match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &db, self.format).await,
            Commands::User(args) => user::execute(args, &db, config, self.format).await,
            Commands::Code(args) => code::execute(args, &db, config, self.format).await,
            Commands::Share(args) => share::execute(args, &db, config, self.format).await,
            Commands::Maintenance(args) => maintenance::execute(args, &db, config).await,
        };
        db.close().await;
        result
    }
}

/// Helper: open the database pool from config
async fn connect(config: &AppConfig) -> Result<DatabasePool, AppError> {
    DatabasePool::connect(&config.database).await
}

/// Helper: map a dialoguer failure
pub(crate) fn input_error(e: dialoguer::Error) -> AppError {
    AppError::internal(format!("Input error: {e}"))
}
