//! Upload and tracking against a mock backend that also serves the
//! presigned storage URL.

use mockito::Matcher;
use scout_api_client::{
    ApiClient, JobStatusPoller, PollEvent, PollState, UploadOrchestrator,
};
use scout_core::{ClientConfig, JobStatus, ScoutError, VideoFile};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn config_for(server: &mockito::Server) -> ClientConfig {
    ClientConfig {
        api_base_url: server.url(),
        poll_interval: Duration::from_millis(50),
        ..ClientConfig::default()
    }
}

fn job_body(job_id: &str, status: &str) -> String {
    json!({
        "jobId": job_id,
        "userId": "user-42",
        "status": status,
        "s3KeyInput": "k1",
        "createdAt": "2025-03-01T10:00:00+00:00"
    })
    .to_string()
}

#[tokio::test]
async fn upload_then_track_to_completion() {
    let mut server = mockito::Server::new_async().await;
    let store_url = format!("{}/store/k1", server.url());

    let presign = server
        .mock("POST", "/upload-url")
        .match_body(Matcher::Json(json!({"content_type": "video/mp4"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"key": "k1", "url": store_url}).to_string())
        .create_async()
        .await;
    let put = server
        .mock("PUT", "/store/k1")
        .match_header("content-type", "video/mp4")
        .with_status(200)
        .create_async()
        .await;
    let create = server
        .mock("POST", "/jobs")
        .match_body(Matcher::Json(
            json!({"s3_key_input": "k1", "user_id": "user-42"}),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(job_body("j1", "PENDING"))
        .create_async()
        .await;
    // The first matching mock with hits left answers, so the COMPLETED mock
    // only applies once both PROCESSING responses are used up.
    server
        .mock("GET", "/jobs/j1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(job_body("j1", "PROCESSING"))
        .expect(2)
        .create_async()
        .await;
    server
        .mock("GET", "/jobs/j1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(job_body("j1", "COMPLETED"))
        .create_async()
        .await;

    let config = config_for(&server);
    let client = Arc::new(ApiClient::from_config(&config).unwrap());
    let orchestrator = UploadOrchestrator::from_client(client.clone(), &config);

    let file = VideoFile::new("match.mp4", "video/mp4", vec![0u8; 64]);
    let job = orchestrator.upload(&file).await.unwrap();

    presign.assert_async().await;
    put.assert_async().await;
    create.assert_async().await;
    assert_eq!(job.job_id, "j1");
    assert_eq!(job.status, JobStatus::Pending);

    let (handle, mut events) = JobStatusPoller::from_client(client)
        .track_events(&job.job_id, config.poll_interval)
        .unwrap();

    let mut seen = Vec::new();
    while let Some(event) = events.recv().await {
        match event {
            PollEvent::Update(job) => seen.push(job.status),
            PollEvent::Terminal(job) => {
                assert_eq!(job.status, JobStatus::Completed);
                break;
            }
            PollEvent::Error(message) => panic!("unexpected poll error: {}", message),
        }
    }

    assert_eq!(
        seen,
        vec![
            JobStatus::Processing,
            JobStatus::Processing,
            JobStatus::Completed
        ]
    );
    assert_eq!(handle.wait().await, PollState::TerminatedDone);
}

#[tokio::test]
async fn storage_rejection_never_creates_job() {
    let mut server = mockito::Server::new_async().await;
    let store_url = format!("{}/store/k1", server.url());

    server
        .mock("POST", "/upload-url")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"key": "k1", "url": store_url}).to_string())
        .create_async()
        .await;
    server
        .mock("PUT", "/store/k1")
        .with_status(403)
        .with_body("<Error><Code>AccessDenied</Code></Error>")
        .create_async()
        .await;
    let create = server
        .mock("POST", "/jobs")
        .expect(0)
        .create_async()
        .await;

    let config = config_for(&server);
    let client = Arc::new(ApiClient::from_config(&config).unwrap());
    let orchestrator = UploadOrchestrator::from_client(client, &config);

    let file = VideoFile::new("match.mp4", "video/mp4", vec![0u8; 16]);
    let err = orchestrator.upload(&file).await.unwrap_err();

    create.assert_async().await;
    assert!(matches!(err, ScoutError::StorageUpload(_)));
    assert_eq!(err.status(), Some(403));
}

#[tokio::test]
async fn wrong_content_type_never_reaches_backend() {
    let mut server = mockito::Server::new_async().await;
    let presign = server
        .mock("POST", "/upload-url")
        .expect(0)
        .create_async()
        .await;

    let config = config_for(&server);
    let client = Arc::new(ApiClient::from_config(&config).unwrap());
    let orchestrator = UploadOrchestrator::from_client(client, &config);

    let file = VideoFile::new("clip.webm", "video/webm", vec![0u8; 16]);
    let err = orchestrator.upload(&file).await.unwrap_err();

    presign.assert_async().await;
    assert_eq!(
        err.to_string(),
        "Validation error: Content-Type must be video/mp4, got: video/webm"
    );
}

#[tokio::test]
async fn cancelled_session_stops_fetching() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/jobs/j9")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(job_body("j9", "PROCESSING"))
        .create_async()
        .await;

    let client = Arc::new(
        ApiClient::new(server.url(), Duration::from_secs(5), Duration::from_secs(5)).unwrap(),
    );
    let (handle, mut events) = JobStatusPoller::from_client(client)
        .track_events("j9", Duration::from_millis(20))
        .unwrap();

    assert!(matches!(events.recv().await, Some(PollEvent::Update(_))));
    handle.cancel();
    assert_eq!(handle.wait().await, PollState::TerminatedCancelled);

    // The session task dropped its listener, so the channel drains and closes.
    while events.recv().await.is_some() {}
    let fetched = handle.snapshot().fetch_count;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(handle.snapshot().fetch_count, fetched);
}

#[tokio::test]
async fn overlong_user_id_never_reaches_backend() {
    let mut server = mockito::Server::new_async().await;
    let presign = server
        .mock("POST", "/upload-url")
        .expect(0)
        .create_async()
        .await;
    let put = server.mock("PUT", Matcher::Any).expect(0).create_async().await;

    let config = ClientConfig {
        user_id: "u".repeat(300),
        ..config_for(&server)
    };
    let client = Arc::new(ApiClient::from_config(&config).unwrap());
    let orchestrator = UploadOrchestrator::from_client(client, &config);

    let file = VideoFile::new("match.mp4", "video/mp4", vec![0u8; 16]);
    let err = orchestrator.upload(&file).await.unwrap_err();

    presign.assert_async().await;
    put.assert_async().await;
    assert!(matches!(err, ScoutError::Validation(_)));
    assert!(err.to_string().contains("User id too long"));
}
