//! Password hashing, policy enforcement and self-service change.

pub mod change;
pub mod hasher;
pub mod validator;

pub use change::{PasswordChange, PasswordService};
pub use hasher::PasswordHasher;
pub use validator::PasswordValidator;
