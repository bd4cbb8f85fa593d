//! # portal-database
//!
//! Persistence for the secure sharing portal: the store traits the auth and
//! service layers depend on, their PostgreSQL implementations, and an
//! in-memory implementation with the same atomic semantics for single-node
//! use and tests.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use store::{AccountStore, FileCatalog, LoginAttemptStore, QuotaStore, ShareStore};
