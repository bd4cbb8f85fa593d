//! Unified application error types for the portal.
//!
//! Every crate maps its internal failures into [`AppError`] so that the
//! access-control core exposes one closed set of outcomes to presentation
//! code. The [`ErrorKind`] is what callers branch on; the message is for
//! logs, and [`AppError::public_message`] is what may be shown to a client.

use std::fmt;
use thiserror::Error;

/// Closed error taxonomy of the access-control and sharing core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Unknown principal or wrong secret.
    InvalidCredentials,
    /// The account or access code is past its expiry date.
    AccountExpired,
    /// Too many failed attempts inside the lockout window.
    RateLimited,
    /// The access code has no remaining uses.
    CodeExhausted,
    /// The principal's role or ownership does not allow the action.
    PermissionDenied,
    /// The requested record does not exist (or references one that does not).
    NotFound,
    /// The share link was deactivated by its owner or an administrator.
    Deactivated,
    /// The share link is past its expiry time.
    AlreadyExpired,
    /// The share link has been downloaded the maximum number of times.
    DownloadLimitReached,
    /// The share link is password protected and no password was supplied.
    PasswordRequired,
    /// The supplied share password is wrong.
    InvalidPassword,
    /// The upload would exceed the principal's byte quota.
    QuotaExceeded,
    /// The persistence layer or blob storage failed.
    StorageFailure,
    /// Input validation failed.
    Validation,
    /// Configuration could not be loaded.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An unexpected internal error occurred.
    Internal,
}

impl ErrorKind {
    /// Whether this kind belongs to the login rejection family whose
    /// client-visible message must not reveal the real cause.
    pub fn is_login_rejection(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials | Self::AccountExpired | Self::RateLimited
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "INVALID_CREDENTIALS"),
            Self::AccountExpired => write!(f, "ACCOUNT_EXPIRED"),
            Self::RateLimited => write!(f, "RATE_LIMITED"),
            Self::CodeExhausted => write!(f, "CODE_EXHAUSTED"),
            Self::PermissionDenied => write!(f, "PERMISSION_DENIED"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Deactivated => write!(f, "DEACTIVATED"),
            Self::AlreadyExpired => write!(f, "ALREADY_EXPIRED"),
            Self::DownloadLimitReached => write!(f, "DOWNLOAD_LIMIT_REACHED"),
            Self::PasswordRequired => write!(f, "PASSWORD_REQUIRED"),
            Self::InvalidPassword => write!(f, "INVALID_PASSWORD"),
            Self::QuotaExceeded => write!(f, "QUOTA_EXCEEDED"),
            Self::StorageFailure => write!(f, "STORAGE_FAILURE"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout the portal.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message (may contain internal detail).
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid-credentials error.
    pub fn invalid_credentials(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidCredentials, message)
    }

    /// Create an account-expired error.
    pub fn account_expired(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AccountExpired, message)
    }

    /// Create a rate-limited error.
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RateLimited, message)
    }

    /// Create a code-exhausted error.
    pub fn code_exhausted(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CodeExhausted, message)
    }

    /// Create a permission-denied error.
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PermissionDenied, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a deactivated-share error.
    pub fn deactivated(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Deactivated, message)
    }

    /// Create an already-expired share error.
    pub fn already_expired(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AlreadyExpired, message)
    }

    /// Create a download-limit error.
    pub fn download_limit_reached(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DownloadLimitReached, message)
    }

    /// Create a password-required signal.
    pub fn password_required(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PasswordRequired, message)
    }

    /// Create an invalid-password error.
    pub fn invalid_password(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidPassword, message)
    }

    /// Create a quota-exceeded error.
    pub fn quota_exceeded(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::QuotaExceeded, message)
    }

    /// Create a storage-failure error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::StorageFailure, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Returns true if this error is of the given kind.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }

    /// Message that is safe to show to an unauthenticated client.
    ///
    /// Login rejections collapse into one generic message so that responses
    /// do not reveal whether a username exists, is expired, or is locked.
    pub fn public_message(&self) -> String {
        match self.kind {
            ErrorKind::InvalidCredentials
            | ErrorKind::AccountExpired
            | ErrorKind::RateLimited => "Invalid username or password.".to_string(),
            ErrorKind::CodeExhausted => "Access code has reached maximum uses.".to_string(),
            ErrorKind::PermissionDenied => "Permission denied.".to_string(),
            ErrorKind::NotFound => "Not found.".to_string(),
            ErrorKind::Deactivated => "This share link has been deactivated.".to_string(),
            ErrorKind::AlreadyExpired => "This share link has expired.".to_string(),
            ErrorKind::DownloadLimitReached => {
                "This share link has reached its download limit.".to_string()
            }
            ErrorKind::PasswordRequired => "password_required".to_string(),
            ErrorKind::InvalidPassword => "Invalid password.".to_string(),
            ErrorKind::QuotaExceeded => "Upload would exceed your quota limit.".to_string(),
            ErrorKind::Validation => self.message.clone(),
            ErrorKind::StorageFailure
            | ErrorKind::Configuration
            | ErrorKind::Serialization
            | ErrorKind::Internal => "An internal error occurred.".to_string(),
        }
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::StorageFailure, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::with_source(
            ErrorKind::StorageFailure,
            format!("Database error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_rejections_share_public_message() {
        let invalid = AppError::invalid_credentials("no such user 'alice'");
        let locked = AppError::rate_limited("identifier alice_10.0.0.1 locked");
        let expired = AppError::account_expired("temporary account expired");

        assert_eq!(invalid.public_message(), locked.public_message());
        assert_eq!(invalid.public_message(), expired.public_message());
        assert!(!invalid.public_message().contains("alice"));
    }

    #[test]
    fn test_share_states_have_specific_messages() {
        assert_ne!(
            AppError::already_expired("x").public_message(),
            AppError::deactivated("x").public_message()
        );
        assert_eq!(
            AppError::password_required("x").public_message(),
            "password_required"
        );
    }

    #[test]
    fn test_display_includes_kind() {
        let err = AppError::quota_exceeded("900 + 150 > 1000");
        assert_eq!(err.to_string(), "QUOTA_EXCEEDED: 900 + 150 > 1000");
        assert!(err.is(ErrorKind::QuotaExceeded));
    }

    #[test]
    fn test_clone_drops_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let err = AppError::from(io);
        assert!(err.source.is_some());
        let cloned = err.clone();
        assert!(cloned.source.is_none());
        assert_eq!(cloned.kind, ErrorKind::StorageFailure);
    }
}
