//! # portal-entity
//!
//! Domain entity models for the secure sharing portal. Every struct in this
//! crate represents a database table row or a domain value object. All
//! entities derive `Debug`, `Clone`, `Serialize`, `Deserialize`, and database
//! entities additionally derive `sqlx::FromRow`.

pub mod access_code;
pub mod attempt;
pub mod file;
pub mod principal;
pub mod quota;
pub mod share;
pub mod user;
