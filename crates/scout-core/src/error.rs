//! Error types module
//!
//! Every failure the upload-and-track workflow can produce is a `ScoutError`.
//! The upload variants abort the sequence they occur in; `PollFetch` is the
//! only variant a poll session treats as non-fatal.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like a failed status fetch
    Warn,
    /// Error level - for failures that abort an upload
    Error,
}

/// Metadata describing how an error should be reported to the user.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "PRESIGN_FAILED")
    fn error_code(&self) -> &'static str;

    /// Whether the operation that produced this error keeps going
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the user
    fn suggested_action(&self) -> Option<&'static str>;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Why a single HTTP exchange with the backend or the object store failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpFailure {
    /// The server answered with a non-2xx status.
    Status { status: u16, body: Option<String> },
    /// No response was received (connect error, timeout, TLS, ...).
    Transport(String),
    /// A 2xx response body could not be decoded.
    Decode(String),
    /// The request body failed local validation and was never sent.
    InvalidRequest(String),
}

impl HttpFailure {
    /// Build a status failure, dropping empty bodies.
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let body = if body.trim().is_empty() {
            None
        } else {
            Some(body)
        };
        HttpFailure::Status { status, body }
    }

    /// HTTP status code, when the server answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            HttpFailure::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Response body text or transport/decoding detail.
    pub fn detail(&self) -> Option<&str> {
        match self {
            HttpFailure::Status { body, .. } => body.as_deref(),
            HttpFailure::Transport(msg)
            | HttpFailure::Decode(msg)
            | HttpFailure::InvalidRequest(msg) => Some(msg),
        }
    }
}

impl Display for HttpFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            HttpFailure::Status { status, body: None } => write!(f, "status {}", status),
            HttpFailure::Status {
                status,
                body: Some(body),
            } => write!(f, "status {}: {}", status, body.trim()),
            HttpFailure::Transport(msg) => write!(f, "transport error: {}", msg),
            HttpFailure::InvalidRequest(msg) => write!(f, "invalid request: {}", msg),
            HttpFailure::Decode(msg) => write!(f, "invalid response body: {}", msg),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScoutError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Presign failed: {0}")]
    Presign(HttpFailure),

    #[error("Storage upload failed: {0}")]
    StorageUpload(HttpFailure),

    #[error("Create job failed: {0}")]
    JobCreation(HttpFailure),

    #[error("Get job failed: {0}")]
    PollFetch(HttpFailure),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for client operations
pub type ScoutResult<T> = Result<T, ScoutError>;

impl ScoutError {
    /// The underlying HTTP failure, for the variants that wrap one.
    pub fn http_failure(&self) -> Option<&HttpFailure> {
        match self {
            ScoutError::Presign(f)
            | ScoutError::StorageUpload(f)
            | ScoutError::JobCreation(f)
            | ScoutError::PollFetch(f) => Some(f),
            _ => None,
        }
    }

    /// HTTP status carried by the failure, if the server answered.
    pub fn status(&self) -> Option<u16> {
        self.http_failure().and_then(HttpFailure::status_code)
    }
}

impl From<validator::ValidationErrors> for ScoutError {
    fn from(err: validator::ValidationErrors) -> Self {
        ScoutError::Validation(err.to_string())
    }
}

/// Static metadata for each variant: (error_code, recoverable, suggested_action, log_level).
fn scout_error_static_metadata(
    err: &ScoutError,
) -> (&'static str, bool, Option<&'static str>, LogLevel) {
    match err {
        ScoutError::Validation(_) => (
            "VALIDATION_ERROR",
            false,
            Some("Choose a non-empty MP4 file"),
            LogLevel::Debug,
        ),
        ScoutError::Presign(_) => (
            "PRESIGN_FAILED",
            false,
            Some("Check that the API is reachable and try again"),
            LogLevel::Error,
        ),
        ScoutError::StorageUpload(_) => (
            "STORAGE_UPLOAD_FAILED",
            false,
            Some("Request a new upload URL and try again"),
            LogLevel::Error,
        ),
        ScoutError::JobCreation(_) => (
            "JOB_CREATION_FAILED",
            false,
            Some("The video was uploaded; retry creating the job"),
            LogLevel::Error,
        ),
        ScoutError::PollFetch(_) => ("POLL_FETCH_FAILED", true, None, LogLevel::Warn),
        ScoutError::Config(_) => (
            "CONFIG_ERROR",
            false,
            Some("Check SCOUT_* environment variables"),
            LogLevel::Error,
        ),
        ScoutError::Io(_) => (
            "IO_ERROR",
            false,
            Some("Check the file path and permissions"),
            LogLevel::Error,
        ),
    }
}

impl ErrorMetadata for ScoutError {
    fn error_code(&self) -> &'static str {
        scout_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        scout_error_static_metadata(self).1
    }

    fn suggested_action(&self) -> Option<&'static str> {
        scout_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        scout_error_static_metadata(self).3
    }
}
