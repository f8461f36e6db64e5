//! Publisher flow tests against a mocked provider API.

use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use autopub_models::UserId;
use autopub_publish::{
    CredentialStore, DriveClient, Provider, PublishRequest, Publisher, YouTubeClient,
};

async fn write_credential(tokens_dir: &Path, user: &str, provider: &str) {
    let dir = tokens_dir.join(user);
    tokio::fs::create_dir_all(&dir).await.unwrap();
    let credential = json!({
        "access_token": "test-token",
        "client_id": "cid",
        "client_secret": "secret",
    });
    tokio::fs::write(
        dir.join(format!("{provider}.json")),
        credential.to_string(),
    )
    .await
    .unwrap();
}

async fn write_video(dir: &Path, bytes: &[u8]) -> std::path::PathBuf {
    let video = dir.join("final.mp4");
    tokio::fs::write(&video, bytes).await.unwrap();
    video
}

fn request() -> PublishRequest {
    PublishRequest {
        title: "Ma vidéo".into(),
        description: "desc".into(),
        tags: vec!["shorts".into()],
        publish_at: None,
        thumbnail: None,
    }
}

/// Mount the happy resumable path: session open then one accepted PUT.
async fn mount_youtube_happy(server: &MockServer, video_id: &str) {
    Mock::given(method("POST"))
        .and(path("/videos"))
        .and(query_param("uploadType", "resumable"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Location", format!("{}/session/abc", server.uri()).as_str()),
        )
        .mount(server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/session/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": video_id })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn resumable_upload_sends_chunks_until_final_id() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    write_credential(dir.path(), "u1", "youtube").await;
    let video = write_video(dir.path(), b"12345678").await;

    Mock::given(method("POST"))
        .and(path("/videos"))
        .and(query_param("uploadType", "resumable"))
        .and(body_partial_json(json!({
            "snippet": { "categoryId": "22" },
            "status": { "privacyStatus": "public" }
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Location", format!("{}/session/abc", server.uri()).as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;

    // First chunk continues the session, second one completes it
    Mock::given(method("PUT"))
        .and(path("/session/abc"))
        .and(header("Content-Range", "bytes 0-3/8"))
        .respond_with(ResponseTemplate::new(308))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/session/abc"))
        .and(header("Content-Range", "bytes 4-7/8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "vid-123" })))
        .expect(1)
        .mount(&server)
        .await;

    let credentials = Arc::new(CredentialStore::new(dir.path()).unwrap());
    let client = YouTubeClient::new(credentials)
        .unwrap()
        .with_upload_base(server.uri())
        .with_chunk_size(4);

    let video_id = client
        .upload(&UserId::from_string("u1"), &video, &request())
        .await
        .unwrap();
    assert_eq!(video_id, "vid-123");
}

#[tokio::test]
async fn scheduled_upload_requests_private_visibility_with_timestamp() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    write_credential(dir.path(), "u1", "youtube").await;
    let video = write_video(dir.path(), b"data").await;

    Mock::given(method("POST"))
        .and(path("/videos"))
        .and(body_partial_json(json!({
            "status": {
                "privacyStatus": "private",
                "publishAt": "2025-03-01T18:00:00Z"
            }
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Location", format!("{}/session/abc", server.uri()).as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/session/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "vid-sched" })))
        .mount(&server)
        .await;

    let credentials = Arc::new(CredentialStore::new(dir.path()).unwrap());
    let client = YouTubeClient::new(credentials)
        .unwrap()
        .with_upload_base(server.uri());

    let mut req = request();
    req.publish_at = Some(
        chrono::DateTime::parse_from_rfc3339("2025-03-01T18:00:00Z")
            .unwrap()
            .with_timezone(&chrono::Utc),
    );

    let video_id = client
        .upload(&UserId::from_string("u1"), &video, &req)
        .await
        .unwrap();
    assert_eq!(video_id, "vid-sched");
}

#[tokio::test]
async fn thumbnail_attach_failure_is_swallowed() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    write_credential(dir.path(), "u1", "youtube").await;
    let video = write_video(dir.path(), b"data").await;
    let thumb = dir.path().join("thumb.jpg");
    tokio::fs::write(&thumb, b"jpeg").await.unwrap();

    mount_youtube_happy(&server, "vid-42").await;
    Mock::given(method("POST"))
        .and(path("/thumbnails/set"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let credentials = Arc::new(CredentialStore::new(dir.path()).unwrap());
    let client = YouTubeClient::new(credentials)
        .unwrap()
        .with_upload_base(server.uri());

    let mut req = request();
    req.thumbnail = Some(thumb);

    // The upload still succeeds: thumbnail attach is best-effort
    let video_id = client
        .upload(&UserId::from_string("u1"), &video, &req)
        .await
        .unwrap();
    assert_eq!(video_id, "vid-42");
}

#[tokio::test]
async fn provider_rejection_carries_status_detail() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    write_credential(dir.path(), "u1", "youtube").await;
    let video = write_video(dir.path(), b"data").await;

    Mock::given(method("POST"))
        .and(path("/videos"))
        .respond_with(ResponseTemplate::new(403).set_body_string("quotaExceeded"))
        .mount(&server)
        .await;

    let credentials = Arc::new(CredentialStore::new(dir.path()).unwrap());
    let client = YouTubeClient::new(credentials)
        .unwrap()
        .with_upload_base(server.uri());

    let err = client
        .upload(&UserId::from_string("u1"), &video, &request())
        .await
        .unwrap_err();
    assert!(!err.is_not_connected());
    let msg = err.to_string();
    assert!(msg.contains("403"));
    assert!(msg.contains("quotaExceeded"));
}

#[tokio::test]
async fn publish_succeeds_when_drive_never_connected() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    // Only YouTube is connected
    write_credential(dir.path(), "u1", "youtube").await;
    let video = write_video(dir.path(), b"data").await;

    mount_youtube_happy(&server, "vid-77").await;

    let credentials = Arc::new(CredentialStore::new(dir.path()).unwrap());
    let youtube = YouTubeClient::new(Arc::clone(&credentials))
        .unwrap()
        .with_upload_base(server.uri());
    let drive = DriveClient::new(credentials)
        .unwrap()
        .with_bases(server.uri(), server.uri());
    let publisher = Publisher::with_clients(youtube, drive);

    let video_id = publisher
        .publish(&UserId::from_string("u1"), &video, &request())
        .await
        .unwrap();
    assert_eq!(video_id, "vid-77");

    // No Drive call was ever attempted without a credential
    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| !r.url.path().starts_with("/files")));
}

#[tokio::test]
async fn publish_succeeds_when_drive_upload_fails() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    write_credential(dir.path(), "u1", "youtube").await;
    write_credential(dir.path(), "u1", "drive").await;
    let video = write_video(dir.path(), b"data").await;

    mount_youtube_happy(&server, "vid-88").await;
    // Drive folder lookup explodes; the publish must not care
    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&server)
        .await;

    let credentials = Arc::new(CredentialStore::new(dir.path()).unwrap());
    let youtube = YouTubeClient::new(Arc::clone(&credentials))
        .unwrap()
        .with_upload_base(server.uri());
    let drive = DriveClient::new(credentials)
        .unwrap()
        .with_bases(server.uri(), server.uri());
    let publisher = Publisher::with_clients(youtube, drive);

    let video_id = publisher
        .publish(&UserId::from_string("u1"), &video, &request())
        .await
        .unwrap();
    assert_eq!(video_id, "vid-88");
}

#[tokio::test]
async fn drive_upload_reuses_existing_folders() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    write_credential(dir.path(), "u1", "drive").await;
    let video = write_video(dir.path(), b"data").await;

    // Both folder lookups hit, so no folder creation happens
    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({
                "files": [{ "id": "folder-1", "name": "autopub-videos" }]
            })),
        )
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/files"))
        .and(query_param("uploadType", "multipart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "file-1",
            "webViewLink": "https://drive.example/file-1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let credentials = Arc::new(CredentialStore::new(dir.path()).unwrap());
    let drive = DriveClient::new(credentials)
        .unwrap()
        .with_bases(server.uri(), server.uri());

    let link = drive
        .upload(&UserId::from_string("u1"), &video)
        .await
        .unwrap();
    assert_eq!(link, "https://drive.example/file-1");
}

#[tokio::test]
async fn drive_without_credential_reports_not_connected() {
    let dir = tempfile::tempdir().unwrap();
    let credentials = Arc::new(CredentialStore::new(dir.path()).unwrap());
    let drive = DriveClient::new(credentials).unwrap();

    let video = write_video(dir.path(), b"data").await;
    let err = drive
        .upload(&UserId::from_string("u1"), &video)
        .await
        .unwrap_err();
    assert!(err.is_not_connected());
    assert!(err.to_string().contains(Provider::Drive.as_str()));
}
