//! # portal-auth
//!
//! Access control for the secure sharing portal.
//!
//! ## Modules
//!
//! - `password`: Argon2id hashing, policy enforcement and password change
//! - `login`: rate limiting and credential verification
//! - `session`: session state machine, timeouts and CSRF tokens
//! - `rbac`: role/permission table and ownership-aware checks

pub mod login;
pub mod password;
pub mod rbac;
pub mod session;

pub use login::{Authenticator, Credential, RateLimiter};
pub use password::{PasswordChange, PasswordHasher, PasswordService, PasswordValidator};
pub use rbac::{Permission, RbacEngine, RbacPolicies, ResourceAction};
pub use session::{Session, SessionManager, SessionStatus};
