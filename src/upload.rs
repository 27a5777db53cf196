// src/upload.rs
//
// Client-side checks for the free-enrollment proof image before it is
// forwarded to the backend.

pub const MAX_PROOF_BYTES: usize = 2 * 1024 * 1024;

const ALLOWED_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("file must be an image (jpeg, png, gif, webp), got {0}")]
    UnsupportedType(String),
    #[error("file is {size} bytes, limit is 2MB")]
    TooLarge { size: usize },
    #[error("no file uploaded")]
    Empty,
}

pub fn validate_proof(content_type: Option<&str>, size: usize) -> Result<(), UploadError> {
    let essence = content_type
        .map(|ct| ct.split(';').next().unwrap_or("").trim().to_ascii_lowercase())
        .unwrap_or_default();

    if !ALLOWED_TYPES.contains(&essence.as_str()) {
        let shown = if essence.is_empty() {
            "unknown".to_string()
        } else {
            essence
        };
        return Err(UploadError::UnsupportedType(shown));
    }
    if size == 0 {
        return Err(UploadError::Empty);
    }
    if size > MAX_PROOF_BYTES {
        return Err(UploadError::TooLarge { size });
    }
    Ok(())
}

pub fn sanitize_filename(filename: &str) -> String {
    let cleaned: String = filename
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '.' || *c == '_' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        "proof".to_string()
    } else {
        cleaned
    }
}
