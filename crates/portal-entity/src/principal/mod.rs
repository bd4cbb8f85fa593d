//! Authenticated principals and resource ownership.

pub mod model;

pub use model::{Principal, PrincipalKind, PrincipalRef, ResourceOwner};
