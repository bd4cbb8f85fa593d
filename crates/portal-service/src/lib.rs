//! # portal-service
//!
//! Business logic service layer for the secure sharing portal. Each service
//! orchestrates stores and the auth layer to implement one use case.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod context;
pub mod file;
pub mod quota;
pub mod share;

pub use context::RequestContext;
pub use file::{BlobStorage, FileService, UploadRequest};
pub use quota::{QuotaCharge, QuotaLedger};
pub use share::{AccessService, LinkService, ShareOptions, ShareService, UpdateShareRequest};
