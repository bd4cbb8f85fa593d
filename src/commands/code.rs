//! Access code management commands.

use chrono::{Duration, Utc};
use clap::{Args, Subcommand};
use rand::Rng;
use rand::rngs::OsRng;
use serde::Serialize;
use tabled::Tabled;

use portal_core::config::AppConfig;
use portal_core::error::AppError;
use portal_database::DatabasePool;
use portal_database::repositories::AccessCodeRepository;
use portal_entity::access_code::{AccessCode, CreateAccessCode};

use crate::output::{self, OutputFormat};

/// Characters used for generated codes (no 0/O or 1/I).
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Length of a generated code, excluding the separator.
const CODE_LEN: usize = 12;

/// Arguments for code commands
#[derive(Debug, Args)]
pub struct CodeArgs {
    /// Code subcommand
    #[command(subcommand)]
    pub command: CodeCommand,
}

/// Code subcommands
#[derive(Debug, Subcommand)]
pub enum CodeCommand {
    /// Issue a new access code
    Create {
        /// Code text (generated when omitted)
        #[arg(short, long)]
        code: Option<String>,
        /// How many logins the code allows
        #[arg(short, long, default_value_t = 1)]
        max_uses: i32,
        /// Upload quota in bytes (defaults to upload.default_quota_bytes)
        #[arg(short, long)]
        quota: Option<i64>,
        /// Days until the code expires
        #[arg(long)]
        expires_in_days: Option<i64>,
    },
    /// List access codes
    List,
    /// Deactivate an access code
    Revoke {
        /// Code text
        code: String,
    },
}

/// Access code display row
#[derive(Debug, Serialize, Tabled)]
struct CodeRow {
    label: String,
    code: String,
    uses: String,
    quota: String,
    active: bool,
    expires: String,
}

impl From<&AccessCode> for CodeRow {
    fn from(c: &AccessCode) -> Self {
        Self {
            label: c.label(),
            code: c.code.clone(),
            uses: format!("{}/{}", c.current_uses, c.max_uses),
            quota: format!("{}/{}", c.used_quota, c.upload_quota),
            active: c.is_active,
            expires: output::format_time(c.expiry_date),
        }
    }
}

fn generate_code() -> String {
    let chars: String = (0..CODE_LEN)
        .map(|_| CODE_ALPHABET[OsRng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect();
    let (head, tail) = chars.split_at(CODE_LEN / 2);
    format!("{head}-{tail}")
}

/// Execute code commands
pub async fn execute(
    args: &CodeArgs,
    db: &DatabasePool,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let code_repo = AccessCodeRepository::new(db.pool().clone());

    match &args.command {
        CodeCommand::Create {
            code,
            max_uses,
            quota,
            expires_in_days,
        } => {
            if *max_uses <= 0 {
                return Err(AppError::validation("max-uses must be positive"));
            }
            let expiry_date = match expires_in_days {
                Some(days) if *days <= 0 => {
                    return Err(AppError::validation("Expiry must be at least one day"));
                }
                Some(days) => Some(Utc::now() + Duration::days(*days)),
                None => None,
            };
            let code = code.clone().unwrap_or_else(generate_code);

            let created = code_repo
                .create(&CreateAccessCode {
                    code,
                    max_uses: *max_uses,
                    upload_quota: quota.unwrap_or(config.upload.default_quota_bytes),
                    expiry_date,
                    created_by: None,
                })
                .await?;

            output::print_success(&format!("Access code {} issued", created.label()));
            output::print_kv("Code", &created.code);
            output::print_kv("Max uses", &created.max_uses.to_string());
            output::print_kv("Expires", &output::format_time(created.expiry_date));
        }
        CodeCommand::List => {
            let codes = code_repo.find_all().await?;
            let rows: Vec<CodeRow> = codes.iter().map(CodeRow::from).collect();
            output::print_list(&rows, format);
        }
        CodeCommand::Revoke { code } => {
            let found = code_repo
                .find_active_by_code(code)
                .await?
                .ok_or_else(|| AppError::not_found("No active access code matches"))?;
            code_repo.deactivate(found.id).await?;
            output::print_success(&format!("Access code {} revoked", found.label()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_code_shape() {
        let code = generate_code();
        assert_eq!(code.len(), CODE_LEN + 1);
        assert_eq!(code.as_bytes()[CODE_LEN / 2], b'-');
        assert!(code
            .bytes()
            .filter(|b| *b != b'-')
            .all(|b| CODE_ALPHABET.contains(&b)));
    }
}
