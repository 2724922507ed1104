use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ScoutResult;
use crate::validation::{content_type_for_path, VideoValidator};

/// Body of `POST /upload-url`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PresignRequest {
    pub content_type: String,
}

/// Response of `POST /upload-url`: object key plus presigned PUT URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PresignResponse {
    pub key: String,
    pub url: String,
}

/// One-time upload destination. Never persisted.
///
/// `content_type` is the type the URL was signed for; the storage PUT must
/// declare exactly this value or the store rejects the write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    pub object_key: String,
    pub upload_url: String,
    pub content_type: String,
}

impl UploadTarget {
    pub fn from_presign(response: PresignResponse, content_type: impl Into<String>) -> Self {
        Self {
            object_key: response.key,
            upload_url: response.url,
            content_type: content_type.into(),
        }
    }
}

/// A local file selected for upload, with the media type it declares.
#[derive(Clone)]
pub struct VideoFile {
    file_name: String,
    content_type: String,
    bytes: Bytes,
}

impl VideoFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, declaring the content type implied by its extension.
    ///
    /// Files larger than `max_bytes` are rejected before any bytes are read.
    pub async fn from_path(path: impl AsRef<Path>, max_bytes: u64) -> ScoutResult<Self> {
        let path = path.as_ref();
        let content_type = content_type_for_path(path);
        Self::from_path_with_type(path, content_type, max_bytes).await
    }

    /// Read a file from disk with an explicitly declared content type.
    pub async fn from_path_with_type(
        path: impl AsRef<Path>,
        content_type: impl Into<String>,
        max_bytes: u64,
    ) -> ScoutResult<Self> {
        let path = path.as_ref();
        let size = tokio::fs::metadata(path).await?.len();
        VideoValidator::new(max_bytes).validate_max_size(size)?;

        let data = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.mp4")
            .to_string();

        Ok(Self::new(file_name, content_type, data))
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Cheap clone of the file contents.
    pub fn bytes(&self) -> Bytes {
        self.bytes.clone()
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for VideoFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}
