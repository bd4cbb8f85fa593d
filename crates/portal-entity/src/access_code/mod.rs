//! Access code domain entities.

pub mod model;

pub use model::{AccessCode, CreateAccessCode};
