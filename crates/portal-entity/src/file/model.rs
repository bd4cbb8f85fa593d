//! File entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::principal::ResourceOwner;

/// Metadata of an uploaded file.
///
/// Exactly one of `owner_user_id` and `owner_code_id` is set.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FileRecord {
    /// Unique file identifier.
    pub id: Uuid,
    /// Name supplied by the uploader.
    pub original_filename: String,
    /// Randomized name under the upload directory.
    pub stored_path: String,
    /// File size in bytes.
    pub size_bytes: i64,
    /// SHA-256 of the content, hex encoded.
    pub file_hash: String,
    /// MIME type of the file.
    pub mime_type: Option<String>,
    /// Uploading account.
    pub owner_user_id: Option<Uuid>,
    /// Uploading access code.
    pub owner_code_id: Option<Uuid>,
    /// When the file was uploaded.
    pub uploaded_at: DateTime<Utc>,
    /// Date after which the file is due for removal.
    pub expiry_date: Option<DateTime<Utc>>,
}

impl FileRecord {
    /// Ownership columns for RBAC checks.
    pub fn owner(&self) -> ResourceOwner {
        ResourceOwner {
            user: self.owner_user_id,
            code: self.owner_code_id,
        }
    }

    /// Get the file extension (lowercase), if any.
    pub fn extension(&self) -> Option<String> {
        self.original_filename
            .rsplit('.')
            .next()
            .filter(|ext| *ext != self.original_filename)
            .map(|ext| ext.to_lowercase())
    }
}

/// Data required to create a new file record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFileRecord {
    /// Name supplied by the uploader.
    pub original_filename: String,
    /// Randomized stored name.
    pub stored_path: String,
    /// File size in bytes.
    pub size_bytes: i64,
    /// SHA-256 hex digest.
    pub file_hash: String,
    /// MIME type.
    pub mime_type: Option<String>,
    /// Owner columns.
    pub owner: ResourceOwner,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension() {
        let mut file = FileRecord {
            id: Uuid::new_v4(),
            original_filename: "Report.PDF".to_string(),
            stored_path: "x".to_string(),
            size_bytes: 1,
            file_hash: String::new(),
            mime_type: None,
            owner_user_id: Some(Uuid::new_v4()),
            owner_code_id: None,
            uploaded_at: Utc::now(),
            expiry_date: None,
        };
        assert_eq!(file.extension().as_deref(), Some("pdf"));
        file.original_filename = "README".to_string();
        assert_eq!(file.extension(), None);
    }
}
