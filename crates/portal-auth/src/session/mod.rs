//! Per-request session state, timeouts and CSRF tokens.

pub mod csrf;
pub mod manager;
pub mod state;

pub use manager::SessionManager;
pub use state::{ExpiryReason, Session, SessionStatus};
