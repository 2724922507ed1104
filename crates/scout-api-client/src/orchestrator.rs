//! Upload orchestration: presign, transfer, register.
//!
//! The three stages run strictly in sequence because each consumes the
//! previous stage's output. Every stage returns a tagged `ScoutError`, and the
//! first failure aborts the sequence. Nothing is compensated: a failure after
//! the transfer leaves the uploaded object in storage without a job.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;
use std::time::Instant;

use scout_core::{
    constants::MAX_OBJECT_KEY_CHARS, validate_user_id, ClientConfig, CreateJobRequest,
    HttpFailure, Job, ScoutError, ScoutResult, UploadTarget, VideoFile, VideoValidator,
};
use validator::Validate;

use crate::{ApiClient, JobsApi, ObjectUploader};

/// Stages of one upload, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    Validate,
    AcquireTarget,
    Transfer,
    Register,
}

impl Display for UploadStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            UploadStage::Validate => write!(f, "validate"),
            UploadStage::AcquireTarget => write!(f, "acquire_target"),
            UploadStage::Transfer => write!(f, "transfer"),
            UploadStage::Register => write!(f, "register"),
        }
    }
}

/// Drives the presign → upload → register sequence for one file at a time.
#[derive(Clone)]
pub struct UploadOrchestrator {
    api: Arc<dyn JobsApi>,
    store: Arc<dyn ObjectUploader>,
    validator: VideoValidator,
    user_id: String,
}

impl UploadOrchestrator {
    pub fn new(
        api: impl JobsApi + 'static,
        store: impl ObjectUploader + 'static,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            api: Arc::new(api),
            store: Arc::new(store),
            validator: VideoValidator::default(),
            user_id: user_id.into(),
        }
    }

    /// Orchestrator backed by one `ApiClient` for both the backend and storage.
    pub fn from_client(client: Arc<ApiClient>, config: &ClientConfig) -> Self {
        Self::new(client.clone(), client, config.user_id.clone())
            .with_validator(VideoValidator::new(config.max_upload_bytes))
    }

    pub fn with_validator(mut self, validator: VideoValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Upload `file` and register a job for it.
    pub async fn upload(&self, file: &VideoFile) -> ScoutResult<Job> {
        self.upload_for_match(file, None).await
    }

    /// Same as [`upload`](Self::upload), tagging the job with a match id.
    pub async fn upload_for_match(
        &self,
        file: &VideoFile,
        match_id: Option<String>,
    ) -> ScoutResult<Job> {
        let started = Instant::now();

        self.validate(file)?;
        let target = self.acquire_target().await?;
        self.transfer(&target, file).await?;
        let job = self.register(&target, match_id).await?;

        tracing::info!(
            job_id = %job.job_id,
            object_key = %target.object_key,
            status = %job.status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Upload complete, job created"
        );

        Ok(job)
    }

    fn validate(&self, file: &VideoFile) -> ScoutResult<()> {
        validate_user_id(&self.user_id)
            .and_then(|()| self.validator.validate(file))
            .inspect_err(|e| {
                tracing::debug!(
                    stage = %UploadStage::Validate,
                    file_name = %file.file_name(),
                    error = %e,
                    "Rejected file before upload"
                );
            })
    }

    async fn acquire_target(&self) -> ScoutResult<UploadTarget> {
        let target = self
            .api
            .request_upload_target(self.validator.content_type())
            .await
            .and_then(|target| {
                if target.object_key.is_empty() || target.upload_url.is_empty() {
                    return Err(ScoutError::Presign(HttpFailure::Decode(
                        "presign response is missing key or url".to_string(),
                    )));
                }
                if target.object_key.chars().count() > MAX_OBJECT_KEY_CHARS {
                    return Err(ScoutError::Presign(HttpFailure::Decode(format!(
                        "presign key exceeds {} characters",
                        MAX_OBJECT_KEY_CHARS
                    ))));
                }
                Ok(target)
            })
            .inspect_err(|e| log_stage_failure(UploadStage::AcquireTarget, e))?;

        tracing::debug!(
            stage = %UploadStage::AcquireTarget,
            object_key = %target.object_key,
            "Upload target acquired"
        );
        Ok(target)
    }

    async fn transfer(&self, target: &UploadTarget, file: &VideoFile) -> ScoutResult<()> {
        let started = Instant::now();
        self.store
            .put_object(target, file.bytes())
            .await
            .inspect_err(|e| {
                log_stage_failure(UploadStage::Transfer, e);
                tracing::warn!(
                    object_key = %target.object_key,
                    "Upload target abandoned without cleanup"
                );
            })?;

        tracing::debug!(
            stage = %UploadStage::Transfer,
            object_key = %target.object_key,
            bytes = file.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Object uploaded"
        );
        Ok(())
    }

    async fn register(&self, target: &UploadTarget, match_id: Option<String>) -> ScoutResult<Job> {
        let request = CreateJobRequest::new(target.object_key.clone(), self.user_id.clone())
            .with_match_id(match_id);

        let result = match request.validate() {
            Ok(()) => self.api.create_job(&request).await,
            // Past the transfer; never surfaced as a Validation error.
            Err(e) => Err(ScoutError::JobCreation(HttpFailure::InvalidRequest(
                e.to_string(),
            ))),
        };

        result.inspect_err(|e| {
            log_stage_failure(UploadStage::Register, e);
            tracing::warn!(
                object_key = %target.object_key,
                "Uploaded object has no job record"
            );
        })
    }
}

fn log_stage_failure(stage: UploadStage, error: &ScoutError) {
    tracing::error!(
        stage = %stage,
        status = ?error.status(),
        error = %error,
        "Upload stage failed"
    );
}
