//! Persistence contracts consumed by the auth and service layers.
//!
//! Every conditional update here is a single round trip: implementations
//! must never split the check and the write, otherwise racing requests can
//! overrun access-code uses, download caps or quotas.

pub mod account;
pub mod attempt;
pub mod file;
pub mod quota;
pub mod share;

pub use account::AccountStore;
pub use attempt::LoginAttemptStore;
pub use file::FileCatalog;
pub use quota::QuotaStore;
pub use share::ShareStore;
