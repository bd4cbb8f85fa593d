//! Share link management commands.

use chrono::Utc;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use portal_core::config::AppConfig;
use portal_core::error::AppError;
use portal_database::DatabasePool;
use portal_database::store::ShareStore;
use portal_entity::share::ShareToken;

use crate::output::{self, OutputFormat};

/// Arguments for share commands
#[derive(Debug, Args)]
pub struct ShareArgs {
    /// Share subcommand
    #[command(subcommand)]
    pub command: ShareCommand,
}

/// Share subcommands
#[derive(Debug, Subcommand)]
pub enum ShareCommand {
    /// List share links
    List {
        /// Only shares that still allow downloads
        #[arg(long)]
        usable: bool,
    },
    /// Deactivate a share link
    Revoke {
        /// Share ID
        id: Uuid,
    },
}

/// Share display row
#[derive(Debug, Serialize, Tabled)]
struct ShareRow {
    id: String,
    file_id: String,
    url: String,
    downloads: String,
    protected: bool,
    public: bool,
    state: String,
    expires: String,
}

fn state_of(share: &ShareToken) -> &'static str {
    if !share.is_active {
        "deactivated"
    } else if share.is_expired_at(Utc::now()) {
        "expired"
    } else if share.limit_reached() {
        "limit reached"
    } else {
        "active"
    }
}

/// Execute share commands
pub async fn execute(
    args: &ShareArgs,
    db: &DatabasePool,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let shares = db.stores().shares;

    match &args.command {
        ShareCommand::List { usable } => {
            let rows: Vec<ShareRow> = shares
                .list_all()
                .await?
                .iter()
                .filter(|s| !usable || state_of(s) == "active")
                .map(|s| ShareRow {
                    id: s.id.to_string(),
                    file_id: s.file_id.to_string(),
                    url: config.share.link_for(&s.token),
                    downloads: match s.max_downloads {
                        Some(max) => format!("{}/{max}", s.download_count),
                        None => s.download_count.to_string(),
                    },
                    protected: s.is_password_protected(),
                    public: s.is_public,
                    state: state_of(s).to_string(),
                    expires: output::format_time(s.expires_at),
                })
                .collect();
            output::print_list(&rows, format);
        }
        ShareCommand::Revoke { id } => {
            if !shares.deactivate(*id).await? {
                return Err(AppError::not_found(format!("Share {id} not found")));
            }
            output::print_success(&format!("Share {id} deactivated"));
        }
    }

    Ok(())
}
