//! Seams between the workflow components and the network.
//!
//! `ApiClient` implements both traits; tests substitute in-memory fakes.

use async_trait::async_trait;
use bytes::Bytes;
use scout_core::{CreateJobRequest, Job, ScoutResult, UploadTarget};
use std::sync::Arc;

/// Backend job API.
///
/// Implementations tag their failures: `request_upload_target` with
/// `ScoutError::Presign`, `create_job` with `ScoutError::JobCreation`, and
/// `get_job` with `ScoutError::PollFetch`.
#[async_trait]
pub trait JobsApi: Send + Sync {
    /// Request a one-time upload destination signed for `content_type`.
    async fn request_upload_target(&self, content_type: &str) -> ScoutResult<UploadTarget>;

    /// Create a job record referencing an uploaded object.
    async fn create_job(&self, request: &CreateJobRequest) -> ScoutResult<Job>;

    /// Fetch the current snapshot of a job.
    async fn get_job(&self, job_id: &str) -> ScoutResult<Job>;
}

/// Direct object-storage writes through a presigned URL.
#[async_trait]
pub trait ObjectUploader: Send + Sync {
    /// PUT `body` to `target.upload_url`, declaring `target.content_type`.
    /// Failures are `ScoutError::StorageUpload`.
    async fn put_object(&self, target: &UploadTarget, body: Bytes) -> ScoutResult<()>;
}

#[async_trait]
impl<T: JobsApi + ?Sized> JobsApi for Arc<T> {
    async fn request_upload_target(&self, content_type: &str) -> ScoutResult<UploadTarget> {
        (**self).request_upload_target(content_type).await
    }

    async fn create_job(&self, request: &CreateJobRequest) -> ScoutResult<Job> {
        (**self).create_job(request).await
    }

    async fn get_job(&self, job_id: &str) -> ScoutResult<Job> {
        (**self).get_job(job_id).await
    }
}

#[async_trait]
impl<T: ObjectUploader + ?Sized> ObjectUploader for Arc<T> {
    async fn put_object(&self, target: &UploadTarget, body: Bytes) -> ScoutResult<()> {
        (**self).put_object(target, body).await
    }
}
