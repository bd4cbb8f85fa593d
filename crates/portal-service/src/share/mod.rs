//! Share links: creation and management by owners, validation and
//! download counting for anonymous holders.

pub mod access;
pub mod link;
pub mod service;

pub use access::{AccessService, SharedDownload};
pub use link::LinkService;
pub use service::{ShareOptions, ShareService, UpdateShareRequest};
