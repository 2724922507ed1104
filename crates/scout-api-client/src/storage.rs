//! Direct upload to object storage through a presigned URL.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use scout_core::{ScoutError, ScoutResult, UploadTarget};

use crate::{ensure_success, ApiClient, ObjectUploader};

#[async_trait]
impl ObjectUploader for ApiClient {
    async fn put_object(&self, target: &UploadTarget, body: Bytes) -> ScoutResult<()> {
        // The presigned URL carries its own authorization; the signature covers
        // the Content-Type, so it must be exactly the signed value.
        let request = self
            .http()
            .put(&target.upload_url)
            .header(CONTENT_TYPE, target.content_type.as_str())
            .timeout(self.upload_timeout())
            .body(body);

        ensure_success(request)
            .await
            .map_err(ScoutError::StorageUpload)?;

        Ok(())
    }
}
