//! # portal-core
//!
//! Core crate for the secure sharing portal. Holds the unified error
//! taxonomy, the result alias, and every configuration section.
//!
//! This crate has **no** dependencies on other portal crates.

pub mod config;
pub mod error;
pub mod result;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
