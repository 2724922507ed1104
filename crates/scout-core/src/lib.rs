//! ScoutAI Core Library
//!
//! Domain models, error types, client configuration and local file validation
//! shared by the API client and the CLI.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::{ErrorMetadata, HttpFailure, LogLevel, ScoutError, ScoutResult};
pub use models::{
    CreateJobRequest, IndexResponse, Job, JobStatus, PresignRequest, PresignResponse,
    UploadTarget, VideoFile,
};
pub use validation::{validate_user_id, VideoValidator};
