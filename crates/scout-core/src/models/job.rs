use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use validator::Validate;


/// Lifecycle of a processing job. Variant order follows the lifecycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// `Completed` and `Failed` never transition again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "PENDING",
            JobStatus::Processing => "PROCESSING",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Failed => "FAILED",
        }
    }
}

impl Display for JobStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Read-only snapshot of a job record owned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Job {
    #[serde(rename = "jobId")]
    pub job_id: String,
    pub status: JobStatus,
    /// Object key of the uploaded video. Older records may omit it.
    #[serde(rename = "s3KeyInput", default)]
    pub input_key: String,
    #[serde(
        rename = "s3KeyOutput",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub output_key: Option<String>,
    #[serde(rename = "metricsKey", default, skip_serializing_if = "Option::is_none")]
    pub metrics_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(rename = "matchId", default, skip_serializing_if = "Option::is_none")]
    pub match_id: Option<String>,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Job {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Body of `POST /jobs`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq, Eq)]
pub struct CreateJobRequest {
    /// Object key returned by the presign step
    #[validate(length(
        min = 1,
        max = 1024,
        message = "Object key must be between 1 and 1024 characters"
    ))]
    pub s3_key_input: String,
    #[validate(length(
        min = 1,
        max = 255,
        message = "User id must be between 1 and 255 characters"
    ))]
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_id: Option<String>,
}

impl CreateJobRequest {
    pub fn new(s3_key_input: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            s3_key_input: s3_key_input.into(),
            user_id: user_id.into(),
            match_id: None,
        }
    }

    pub fn with_match_id(mut self, match_id: Option<String>) -> Self {
        self.match_id = match_id;
        self
    }
}
