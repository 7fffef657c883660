//! Uploaded image validation.

use crate::error::{FinderError, Result};

/// Maximum accepted upload size (10 MiB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Content types accepted by `/search`.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp", "image/gif"];

/// An image submitted for reverse search.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Build an upload, rejecting unsupported types and oversized payloads.
    pub fn new(file_name: impl Into<String>, content_type: &str, bytes: Vec<u8>) -> Result<Self> {
        check_content_type(content_type)?;
        check_size(bytes.len())?;
        Ok(Self {
            file_name: file_name.into(),
            content_type: content_type.to_ascii_lowercase(),
            bytes,
        })
    }
}

pub fn check_content_type(content_type: &str) -> Result<()> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if ALLOWED_CONTENT_TYPES.contains(&essence.as_str()) {
        Ok(())
    } else {
        Err(FinderError::Validation(
            "Invalid file type. Only JPEG, PNG, WEBP and GIF images are allowed.".to_string(),
        ))
    }
}

pub fn check_size(len: usize) -> Result<()> {
    if len > MAX_UPLOAD_BYTES {
        Err(FinderError::Validation(
            "File too large. Maximum size is 10MB.".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Content type for a local file, guessed from its extension.
pub fn content_type_for_path(path: &std::path::Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_content_types() {
        assert!(check_content_type("image/png").is_ok());
        assert!(check_content_type("IMAGE/JPEG").is_ok());
        assert!(check_content_type("image/webp; charset=binary").is_ok());
        assert!(check_content_type("image/bmp").is_err());
        assert!(check_content_type("application/pdf").is_err());
    }

    #[test]
    fn test_size_cap() {
        assert!(check_size(MAX_UPLOAD_BYTES).is_ok());
        let err = check_size(15 * 1024 * 1024).unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_upload_rejects_bad_type() {
        let err = ImageUpload::new("a.bmp", "image/bmp", vec![0; 10]).unwrap_err();
        assert!(err.to_string().contains("Invalid file type"));
    }

    #[test]
    fn test_content_type_for_path() {
        assert_eq!(content_type_for_path(Path::new("panel.JPG")), Some("image/jpeg"));
        assert_eq!(content_type_for_path(Path::new("panel.webp")), Some("image/webp"));
        assert_eq!(content_type_for_path(Path::new("panel.tiff")), None);
        assert_eq!(content_type_for_path(Path::new("panel")), None);
    }
}
