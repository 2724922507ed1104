//! In-memory backend for orchestrator and poller tests.

use async_trait::async_trait;
use bytes::Bytes;
use scout_core::{
    CreateJobRequest, HttpFailure, Job, JobStatus, ScoutError, ScoutResult, UploadTarget,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

use crate::{JobsApi, ObjectUploader};

/// A network call observed by the fake, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Presign(String),
    Put {
        url: String,
        content_type: String,
        len: usize,
    },
    CreateJob(CreateJobRequest),
    GetJob(String),
}

/// Scripted outcome of one `get_job` call.
pub enum Step {
    Status(JobStatus),
    Fail(HttpFailure),
    Delayed(Duration, JobStatus),
    /// Signal `started`, then wait for `release` before answering.
    Gated {
        started: Arc<Notify>,
        release: Arc<Notify>,
        status: JobStatus,
    },
}

pub struct FakeBackend {
    calls: Mutex<Vec<Call>>,
    presign_key: String,
    presign_url: String,
    created_job: Job,
    fail_presign: Option<HttpFailure>,
    fail_put: Option<HttpFailure>,
    fail_create: Option<HttpFailure>,
    steps: Mutex<VecDeque<Step>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

pub fn job(job_id: &str, status: JobStatus) -> Job {
    Job {
        job_id: job_id.to_string(),
        status,
        input_key: "k1".to_string(),
        output_key: None,
        metrics_key: None,
        error: None,
        user_id: None,
        match_id: None,
        created_at: None,
        updated_at: None,
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            presign_key: "k1".to_string(),
            presign_url: "https://store/k1".to_string(),
            created_job: job("j1", JobStatus::Pending),
            fail_presign: None,
            fail_put: None,
            fail_create: None,
            steps: Mutex::new(VecDeque::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_presign(mut self, key: &str, url: &str) -> Self {
        self.presign_key = key.to_string();
        self.presign_url = url.to_string();
        self
    }

    pub fn failing_presign(mut self, failure: HttpFailure) -> Self {
        self.fail_presign = Some(failure);
        self
    }

    pub fn failing_put(mut self, failure: HttpFailure) -> Self {
        self.fail_put = Some(failure);
        self
    }

    pub fn failing_create(mut self, failure: HttpFailure) -> Self {
        self.fail_create = Some(failure);
        self
    }

    pub fn with_steps(self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.steps
            .lock()
            .expect("steps lock")
            .extend(steps);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn get_job_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::GetJob(_)))
            .count()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, call: Call) {
        self.calls.lock().expect("calls lock").push(call);
    }
}

#[async_trait]
impl JobsApi for FakeBackend {
    async fn request_upload_target(&self, content_type: &str) -> ScoutResult<UploadTarget> {
        self.record(Call::Presign(content_type.to_string()));
        if let Some(failure) = &self.fail_presign {
            return Err(ScoutError::Presign(failure.clone()));
        }
        Ok(UploadTarget {
            object_key: self.presign_key.clone(),
            upload_url: self.presign_url.clone(),
            content_type: content_type.to_string(),
        })
    }

    async fn create_job(&self, request: &CreateJobRequest) -> ScoutResult<Job> {
        self.record(Call::CreateJob(request.clone()));
        if let Some(failure) = &self.fail_create {
            return Err(ScoutError::JobCreation(failure.clone()));
        }
        Ok(self.created_job.clone())
    }

    async fn get_job(&self, job_id: &str) -> ScoutResult<Job> {
        self.record(Call::GetJob(job_id.to_string()));
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let step = self.steps.lock().expect("steps lock").pop_front();
        let result = match step {
            Some(Step::Status(status)) => Ok(job(job_id, status)),
            Some(Step::Fail(failure)) => Err(ScoutError::PollFetch(failure)),
            Some(Step::Delayed(delay, status)) => {
                tokio::time::sleep(delay).await;
                Ok(job(job_id, status))
            }
            Some(Step::Gated {
                started,
                release,
                status,
            }) => {
                started.notify_one();
                release.notified().await;
                Ok(job(job_id, status))
            }
            None => Ok(job(job_id, JobStatus::Processing)),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

#[async_trait]
impl ObjectUploader for FakeBackend {
    async fn put_object(&self, target: &UploadTarget, body: Bytes) -> ScoutResult<()> {
        self.record(Call::Put {
            url: target.upload_url.clone(),
            content_type: target.content_type.clone(),
            len: body.len(),
        });
        if let Some(failure) = &self.fail_put {
            return Err(ScoutError::StorageUpload(failure.clone()));
        }
        Ok(())
    }
}
