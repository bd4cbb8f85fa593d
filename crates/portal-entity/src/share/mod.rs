//! Share link domain entities.

pub mod link;
pub mod model;

pub use link::ShareLink;
pub use model::{NewShareToken, ShareToken};
