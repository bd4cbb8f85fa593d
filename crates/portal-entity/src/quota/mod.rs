//! Upload quota value objects.

pub mod usage;

pub use usage::{QuotaOwner, QuotaUsage};
