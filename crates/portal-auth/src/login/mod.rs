//! Credential verification with brute-force mitigation.

pub mod authenticator;
pub mod rate_limiter;

pub use authenticator::{Authenticator, Credential};
pub use rate_limiter::RateLimiter;
