//! Data models for the client
//!
//! Wire shapes for the backend API plus the local file handle that feeds the
//! upload workflow.

mod health;
mod job;
mod upload;

pub use health::IndexResponse;
pub use job::{CreateJobRequest, Job, JobStatus};
pub use upload::{PresignRequest, PresignResponse, UploadTarget, VideoFile};
