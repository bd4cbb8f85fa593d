//! Upload request and stored-name helpers.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

/// Longest extension kept in a stored name.
const MAX_EXTENSION_LEN: usize = 10;

/// Extension used when the original name has no usable one.
const FALLBACK_EXTENSION: &str = "bin";

/// Simple upload parameters (single request with full file body).
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Name supplied by the uploader.
    pub file_name: String,
    /// MIME type.
    pub mime_type: Option<String>,
    /// File content bytes.
    pub data: Bytes,
}

impl UploadRequest {
    /// Size of the payload in bytes.
    pub fn size_bytes(&self) -> i64 {
        i64::try_from(self.data.len()).unwrap_or(i64::MAX)
    }
}

/// Lowercase ASCII-alphanumeric extension of `file_name`.
pub fn sanitize_extension(file_name: &str) -> String {
    let ext: String = match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .take(MAX_EXTENSION_LEN)
            .collect::<String>()
            .to_ascii_lowercase(),
        _ => String::new(),
    };
    if ext.is_empty() {
        FALLBACK_EXTENSION.to_string()
    } else {
        ext
    }
}

/// Random stored name: `<32 hex>_<unix-ts>.<ext>`.
///
/// Nothing of the original name except the sanitized extension reaches
/// storage.
pub fn stored_name(file_name: &str, now: DateTime<Utc>) -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    format!(
        "{}_{}.{}",
        hex::encode(bytes),
        now.timestamp(),
        sanitize_extension(file_name)
    )
}

/// SHA-256 of the content, hex encoded.
pub fn content_hash(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_extension() {
        assert_eq!(sanitize_extension("Report.PDF"), "pdf");
        assert_eq!(sanitize_extension("archive.tar.gz"), "gz");
        assert_eq!(sanitize_extension("shell.p/h\\p"), "php");
        assert_eq!(sanitize_extension("README"), "bin");
        assert_eq!(sanitize_extension(".bashrc"), "bin");
        assert_eq!(sanitize_extension("x.abcdefghijklmnop"), "abcdefghij");
    }

    #[test]
    fn test_stored_name_shape() {
        let now = Utc::now();
        let name = stored_name("../../etc/passwd.txt", now);
        let (random, rest) = name.split_once('_').unwrap();
        assert_eq!(random.len(), 32);
        assert!(random.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(rest, format!("{}.txt", now.timestamp()));
        assert!(!name.contains('/'));
    }

    #[test]
    fn test_content_hash() {
        assert_eq!(
            content_hash(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
