//! Byte storage collaborator.

use async_trait::async_trait;
use bytes::Bytes;

use portal_core::result::AppResult;

/// Byte-level storage of uploaded content, addressed by stored name.
///
/// The portal core only orchestrates; the deployment supplies the
/// implementation (upload directory, object store, ...).
#[async_trait]
pub trait BlobStorage: Send + Sync + std::fmt::Debug {
    /// Write `data` under `name`, replacing nothing.
    async fn write(&self, name: &str, data: Bytes) -> AppResult<()>;

    /// Read the full content stored under `name`.
    async fn read(&self, name: &str) -> AppResult<Bytes>;

    /// Remove `name`. Removing a missing name is not an error.
    async fn delete(&self, name: &str) -> AppResult<()>;

    /// Whether `name` exists.
    async fn exists(&self, name: &str) -> AppResult<bool>;
}
