//! Shared constants

/// The only media type the upload workflow accepts.
pub const VIDEO_MP4: &str = "video/mp4";

/// Fallback content type for files with an unknown extension.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Placeholder caller identity until real authentication exists.
pub const DEFAULT_USER_ID: &str = "user-42";

/// Backend used when no base URL is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";

/// Default poll interval for job status tracking.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

/// Largest object a single presigned PUT may carry (5 GiB).
pub const MAX_SINGLE_PUT_BYTES: u64 = 5 * 1024 * 1024 * 1024;

/// Longest user id the backend accepts.
pub const MAX_USER_ID_CHARS: usize = 255;

/// Longest object key a job may reference.
pub const MAX_OBJECT_KEY_CHARS: usize = 1024;
