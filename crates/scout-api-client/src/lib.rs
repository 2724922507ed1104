//! HTTP client for the ScoutAI API.
//!
//! Provides `ApiClient` (backend calls plus the direct PUT to a presigned
//! storage URL), the `JobsApi` / `ObjectUploader` seams it implements, and the
//! two workflow components built on them: `UploadOrchestrator` and
//! `JobStatusPoller`. The CLI uses this crate directly.

pub mod api;
pub mod orchestrator;
pub mod poller;
pub mod storage;
pub mod traits;

#[cfg(test)]
pub(crate) mod test_helpers;

use reqwest::{Client, RequestBuilder, Response};
use scout_core::{ClientConfig, HttpFailure, ScoutError, ScoutResult};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub use orchestrator::{UploadOrchestrator, UploadStage};
pub use poller::{
    ChannelListener, JobStatusListener, JobStatusPoller, PollEvent, PollHandle, PollSession,
    PollState,
};
pub use traits::{JobsApi, ObjectUploader};

/// HTTP client for the ScoutAI API and presigned storage URLs.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    upload_timeout: Duration,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        request_timeout: Duration,
        upload_timeout: Duration,
    ) -> ScoutResult<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| ScoutError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            upload_timeout,
        })
    }

    pub fn from_config(config: &ClientConfig) -> ScoutResult<Self> {
        Self::new(
            config.api_base_url.clone(),
            config.request_timeout,
            config.upload_timeout,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET a backend path and deserialize the JSON response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, HttpFailure> {
        let url = self.build_url(path);
        send_json(self.client.get(&url)).await
    }

    /// POST a JSON body to a backend path and deserialize the JSON response.
    pub async fn post_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, HttpFailure> {
        let url = self.build_url(path);
        send_json(self.client.post(&url).json(body)).await
    }

    pub(crate) fn http(&self) -> &Client {
        &self.client
    }

    pub(crate) fn upload_timeout(&self) -> Duration {
        self.upload_timeout
    }
}

pub(crate) async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
) -> Result<T, HttpFailure> {
    let response = ensure_success(request).await?;
    response
        .json()
        .await
        .map_err(|e| HttpFailure::Decode(e.to_string()))
}

/// Send the request and turn transport errors and non-2xx statuses into `HttpFailure`.
pub(crate) async fn ensure_success(request: RequestBuilder) -> Result<Response, HttpFailure> {
    let response = request
        .send()
        .await
        .map_err(|e| HttpFailure::Transport(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(HttpFailure::status(status.as_u16(), error_text));
    }

    Ok(response)
}
