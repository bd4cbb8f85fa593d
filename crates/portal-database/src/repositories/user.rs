//! User repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use portal_core::error::{AppError, ErrorKind};
use portal_core::result::AppResult;
use portal_entity::user::{CreateUser, Role, UserAccount};

const USER_COLUMNS: &str = "id, username, email, password_hash, role, is_admin, upload_quota, \
     used_quota, is_temporary, expiry_date, is_active, last_login, created_at";

/// Raw `users` row, including the legacy `is_admin` flag.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct UserRow {
    id: Uuid,
    username: String,
    email: Option<String>,
    password_hash: String,
    role: Option<String>,
    is_admin: bool,
    upload_quota: i64,
    used_quota: i64,
    is_temporary: bool,
    expiry_date: Option<DateTime<Utc>>,
    is_active: bool,
    last_login: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl UserRow {
    /// Resolve the effective role.
    ///
    /// `role` is authoritative. Rows written before the column existed only
    /// carry `is_admin`, which is used as the fallback.
    fn resolve_role(&self) -> Role {
        match self.role.as_deref().map(str::parse::<Role>) {
            Some(Ok(role)) if role != Role::Anonymous => role,
            _ if self.is_admin => Role::Admin,
            _ => Role::User,
        }
    }
}

impl From<UserRow> for UserAccount {
    fn from(row: UserRow) -> Self {
        let role = row.resolve_role();
        Self {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            role,
            upload_quota: row.upload_quota,
            used_quota: row.used_quota,
            is_temporary: row.is_temporary,
            expiry_date: row.expiry_date,
            is_active: row.is_active,
            last_login: row.last_login,
            created_at: row.created_at,
        }
    }
}

/// Repository for account CRUD and lookup operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<UserAccount>> {
        sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map(|row| row.map(UserAccount::from))
            .map_err(|e| {
                AppError::with_source(ErrorKind::StorageFailure, "Failed to find user by id", e)
            })
    }

    /// Find a user by exact username, active or not.
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<UserAccount>> {
        sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map(|row| row.map(UserAccount::from))
        .map_err(|e| {
            AppError::with_source(ErrorKind::StorageFailure, "Failed to find user by username", e)
        })
    }

    /// Find an active user by exact username.
    pub async fn find_active_by_username(&self, username: &str) -> AppResult<Option<UserAccount>> {
        sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1 AND is_active = TRUE"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map(|row| row.map(UserAccount::from))
        .map_err(|e| {
            AppError::with_source(ErrorKind::StorageFailure, "Failed to find user by username", e)
        })
    }

    /// List all users, newest first.
    pub async fn find_all(&self) -> AppResult<Vec<UserAccount>> {
        sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map(|rows| rows.into_iter().map(UserAccount::from).collect())
        .map_err(|e| AppError::with_source(ErrorKind::StorageFailure, "Failed to list users", e))
    }

    /// Create a new user.
    ///
    /// Both `role` and the legacy `is_admin` column are written from the
    /// same [`Role`] so they cannot disagree.
    pub async fn create(&self, data: &CreateUser) -> AppResult<UserAccount> {
        sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (username, email, password_hash, role, is_admin, upload_quota, \
             is_temporary, expiry_date) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&data.username)
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(data.role.as_str())
        .bind(data.role.is_admin())
        .bind(data.upload_quota)
        .bind(data.is_temporary)
        .bind(data.expiry_date)
        .fetch_one(&self.pool)
        .await
        .map(UserAccount::from)
        .map_err(|e| AppError::with_source(ErrorKind::StorageFailure, "Failed to create user", e))
    }

    /// Change a user's role, keeping `is_admin` in sync.
    pub async fn update_role(&self, id: Uuid, role: Role) -> AppResult<bool> {
        let result = sqlx::query("UPDATE users SET role = $1, is_admin = $2 WHERE id = $3")
            .bind(role.as_str())
            .bind(role.is_admin())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::StorageFailure, "Failed to update user role", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    /// Enable or disable an account.
    pub async fn set_active(&self, id: Uuid, is_active: bool) -> AppResult<bool> {
        let result = sqlx::query("UPDATE users SET is_active = $1 WHERE id = $2")
            .bind(is_active)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::StorageFailure, "Failed to update user status", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace the stored password hash.
    pub async fn update_password(&self, id: Uuid, password_hash: &str) -> AppResult<bool> {
        let result = sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::StorageFailure, "Failed to update password", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    /// Update the last login timestamp.
    pub async fn update_last_login(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_login = $1 WHERE id = $2")
            .bind(at)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::StorageFailure, "Failed to update last login", e)
            })?;
        Ok(())
    }
}
