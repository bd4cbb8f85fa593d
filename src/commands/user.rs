//! Account management CLI commands.

use chrono::{Duration, Utc};
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use portal_auth::password::{PasswordHasher, PasswordValidator};
use portal_core::config::AppConfig;
use portal_core::error::AppError;
use portal_database::DatabasePool;
use portal_database::repositories::UserRepository;
use portal_entity::user::{CreateUser, Role, UserAccount};

use super::input_error;
use crate::output::{self, OutputFormat};

/// Arguments for user commands
#[derive(Debug, Args)]
pub struct UserArgs {
    /// User subcommand
    #[command(subcommand)]
    pub command: UserCommand,
}

/// User subcommands
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Create an account
    Create {
        /// Username
        #[arg(short, long)]
        username: Option<String>,
        /// Email
        #[arg(short, long)]
        email: Option<String>,
        /// Role (admin or user)
        #[arg(short, long, default_value = "user")]
        role: Role,
        /// Upload quota in bytes (defaults to upload.default_quota_bytes)
        #[arg(short, long)]
        quota: Option<i64>,
        /// Make a temporary account that expires after this many days
        #[arg(long)]
        expires_in_days: Option<i64>,
    },
    /// List all users
    List,
    /// Enable a user
    Enable {
        /// Username
        username: String,
    },
    /// Disable a user
    Disable {
        /// Username
        username: String,
    },
    /// Change a user's role
    Role {
        /// Username
        username: String,
        /// New role (admin or user)
        role: Role,
    },
}

/// User display row for table output
#[derive(Debug, Serialize, Tabled)]
struct UserRow {
    id: String,
    username: String,
    role: String,
    quota: String,
    active: bool,
    expires: String,
    last_login: String,
}

impl From<&UserAccount> for UserRow {
    fn from(u: &UserAccount) -> Self {
        Self {
            id: u.id.to_string(),
            username: u.username.clone(),
            role: u.role.to_string(),
            quota: format!("{}/{}", u.used_quota, u.upload_quota),
            active: u.is_active,
            expires: output::format_time(u.expiry_date.filter(|_| u.is_temporary)),
            last_login: output::format_time(u.last_login),
        }
    }
}

/// Execute user commands
pub async fn execute(
    args: &UserArgs,
    db: &DatabasePool,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let user_repo = UserRepository::new(db.pool().clone());

    match &args.command {
        UserCommand::Create {
            username,
            email,
            role,
            quota,
            expires_in_days,
        } => {
            if *role == Role::Anonymous {
                return Err(AppError::validation("Accounts cannot have the anonymous role"));
            }

            let username = match username {
                Some(u) => u.clone(),
                None => dialoguer::Input::new()
                    .with_prompt("Username")
                    .interact_text()
                    .map_err(input_error)?,
            };

            let password: String = dialoguer::Password::new()
                .with_prompt("Password")
                .with_confirmation("Confirm password", "Passwords do not match")
                .interact()
                .map_err(input_error)?;

            PasswordValidator::new(&config.auth).validate(&username, &password)?;
            let password_hash = PasswordHasher::new().hash_password(&password)?;

            let expiry_date = match expires_in_days {
                Some(days) if *days <= 0 => {
                    return Err(AppError::validation("Expiry must be at least one day"));
                }
                Some(days) => Some(Utc::now() + Duration::days(*days)),
                None => None,
            };

            let user = user_repo
                .create(&CreateUser {
                    username: username.clone(),
                    email: email.clone(),
                    password_hash,
                    role: *role,
                    upload_quota: quota.unwrap_or(config.upload.default_quota_bytes),
                    is_temporary: expiry_date.is_some(),
                    expiry_date,
                })
                .await?;

            output::print_success(&format!("User '{username}' created"));
            output::print_kv("ID", &user.id.to_string());
            output::print_kv("Role", user.role.as_str());
            output::print_kv("Expires", &output::format_time(user.expiry_date));
        }
        UserCommand::List => {
            let users = user_repo.find_all().await?;
            let rows: Vec<UserRow> = users.iter().map(UserRow::from).collect();
            output::print_list(&rows, format);
        }
        UserCommand::Enable { username } => {
            let user = find(&user_repo, username).await?;
            if user.is_active == true {
                output::print_warning(&format!("User '{username}' is already enabled"));
                return Ok(());
            }
            user_repo.set_active(user.id, true).await?;
            output::print_success(&format!("User '{username}' enabled"));
        }
        UserCommand::Disable { username } => {
            let user = find(&user_repo, username).await?;
            if user.is_active == false {
                output::print_warning(&format!("User '{username}' is already disabled"));
                return Ok(());
            }
            user_repo.set_active(user.id, false).await?;
            output::print_success(&format!("User '{username}' disabled"));
        }
        UserCommand::Role { username, role } => {
            if *role == Role::Anonymous {
                return Err(AppError::validation("Accounts cannot have the anonymous role"));
            }
            let user = find(&user_repo, username).await?;
            user_repo.update_role(user.id, *role).await?;
            output::print_success(&format!("User '{username}' is now {role}"));
        }
    }

    Ok(())
}

async fn find(user_repo: &UserRepository, username: &str) -> Result<UserAccount, AppError> {
    user_repo
        .find_by_username(username)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User '{username}' not found")))
}
