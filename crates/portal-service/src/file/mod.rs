//! File upload and removal with quota accounting.

pub mod service;
pub mod storage;
pub mod upload;

pub use service::FileService;
pub use storage::BlobStorage;
pub use upload::UploadRequest;
