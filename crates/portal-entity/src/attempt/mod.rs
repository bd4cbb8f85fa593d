//! Login attempt history.

pub mod model;

pub use model::LoginAttempt;
