//! Role-based access control (RBAC) enforcement.

pub mod engine;
pub mod policies;

pub use engine::{RbacEngine, ResourceAction};
pub use policies::{Permission, RbacPolicies};
