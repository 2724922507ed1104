//! Domain methods for the ScoutAI backend.

use async_trait::async_trait;
use scout_core::{
    CreateJobRequest, HttpFailure, IndexResponse, Job, PresignRequest, PresignResponse,
    ScoutError, ScoutResult, UploadTarget,
};
use validator::Validate;

use crate::{ApiClient, JobsApi};

impl ApiClient {
    /// `GET /`, the backend liveness check.
    pub async fn index(&self) -> Result<IndexResponse, HttpFailure> {
        self.get("/").await
    }
}

#[async_trait]
impl JobsApi for ApiClient {
    async fn request_upload_target(&self, content_type: &str) -> ScoutResult<UploadTarget> {
        let request = PresignRequest {
            content_type: content_type.to_string(),
        };

        let response: PresignResponse = self
            .post_json("/upload-url", &request)
            .await
            .map_err(ScoutError::Presign)?;

        Ok(UploadTarget::from_presign(response, content_type))
    }

    async fn create_job(&self, request: &CreateJobRequest) -> ScoutResult<Job> {
        request.validate()?;

        self.post_json("/jobs", request)
            .await
            .map_err(ScoutError::JobCreation)
    }

    async fn get_job(&self, job_id: &str) -> ScoutResult<Job> {
        self.get(&format!("/jobs/{}", urlencoding::encode(job_id)))
            .await
            .map_err(ScoutError::PollFetch)
    }
}
