//! Local validation of files before any network call is made.

use std::path::Path;

use crate::constants::{MAX_SINGLE_PUT_BYTES, MAX_USER_ID_CHARS, OCTET_STREAM, VIDEO_MP4};
use crate::error::{ScoutError, ScoutResult};
use crate::models::VideoFile;

/// Content type a browser would declare for a file with this extension.
pub fn content_type_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match extension.as_deref() {
        Some("mp4") => VIDEO_MP4,
        Some("webm") => "video/webm",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("mkv") => "video/x-matroska",
        Some("m4v") => "video/x-m4v",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("txt") => "text/plain",
        Some("json") => "application/json",
        _ => OCTET_STREAM,
    }
}

/// Check a caller identity against the bounds the job API enforces.
pub fn validate_user_id(user_id: &str) -> ScoutResult<()> {
    if user_id.trim().is_empty() {
        return Err(ScoutError::Validation("User id must not be empty".to_string()));
    }

    let chars = user_id.chars().count();
    if chars > MAX_USER_ID_CHARS {
        return Err(ScoutError::Validation(format!(
            "User id too long: {} characters (max: {})",
            chars, MAX_USER_ID_CHARS
        )));
    }

    Ok(())
}

/// Validates a file against the upload workflow's preconditions.
#[derive(Debug, Clone)]
pub struct VideoValidator {
    max_file_size: u64,
    content_type: String,
}

impl Default for VideoValidator {
    fn default() -> Self {
        Self::new(MAX_SINGLE_PUT_BYTES)
    }
}

impl VideoValidator {
    pub fn new(max_file_size: u64) -> Self {
        Self {
            max_file_size,
            content_type: VIDEO_MP4.to_string(),
        }
    }

    /// The one content type accepted, and the one the upload is signed for.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn validate_file_size(&self, size: u64) -> ScoutResult<()> {
        if size == 0 {
            return Err(ScoutError::Validation("Empty file".to_string()));
        }

        self.validate_max_size(size)
    }

    /// Upper bound only; usable before the file is read.
    pub fn validate_max_size(&self, size: u64) -> ScoutResult<()> {
        if size > self.max_file_size {
            return Err(ScoutError::Validation(format!(
                "File too large: {} bytes (max: {} bytes)",
                size, self.max_file_size
            )));
        }

        Ok(())
    }

    /// Exact match; `video/MP4` or `video/mp4; codecs=...` are rejected because
    /// the store compares the header byte for byte against the signature.
    pub fn validate_content_type(&self, content_type: &str) -> ScoutResult<()> {
        if content_type != self.content_type {
            let declared = if content_type.is_empty() {
                "unknown"
            } else {
                content_type
            };
            return Err(ScoutError::Validation(format!(
                "Content-Type must be {}, got: {}",
                self.content_type, declared
            )));
        }

        Ok(())
    }

    pub fn validate(&self, file: &VideoFile) -> ScoutResult<()> {
        self.validate_content_type(file.content_type())?;
        self.validate_file_size(file.len())?;
        Ok(())
    }
}
