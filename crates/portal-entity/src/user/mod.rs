//! User domain entities.

pub mod model;
pub mod role;

pub use model::{CreateUser, UserAccount};
pub use role::Role;
