//! Resumable YouTube upload.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};

use autopub_models::UserId;

use crate::credentials::{CredentialStore, Provider};
use crate::error::{PublishError, PublishResult};
use crate::publisher::PublishRequest;

const DEFAULT_UPLOAD_BASE: &str = "https://www.googleapis.com/upload/youtube/v3";

/// Default resumable chunk size (must be a multiple of 256 KiB).
const UPLOAD_CHUNK_SIZE: usize = 8 * 1024 * 1024;

/// YouTube caps: 100 chars for titles, 5000 for descriptions (kept a
/// little under).
const TITLE_MAX_CHARS: usize = 100;
const DESCRIPTION_MAX_CHARS: usize = 4900;

const CATEGORY_PEOPLE_AND_BLOGS: &str = "22";

#[derive(Debug, Serialize)]
struct Snippet {
    title: String,
    description: String,
    tags: Vec<String>,
    #[serde(rename = "categoryId")]
    category_id: String,
}

#[derive(Debug, Serialize)]
struct UploadStatus {
    #[serde(rename = "privacyStatus")]
    privacy_status: &'static str,
    #[serde(rename = "publishAt", skip_serializing_if = "Option::is_none")]
    publish_at: Option<String>,
    #[serde(rename = "selfDeclaredMadeForKids")]
    self_declared_made_for_kids: bool,
}

#[derive(Debug, Serialize)]
struct UploadBody {
    snippet: Snippet,
    status: UploadStatus,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    id: String,
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Build the snippet/status metadata for one upload.
///
/// Immediate publication requests public visibility; a future publish
/// time requests private visibility plus a `publishAt` timestamp, and
/// the platform performs the flip to public.
fn build_metadata(request: &PublishRequest) -> UploadBody {
    let title = if request.title.trim().is_empty() {
        "Sans titre".to_string()
    } else {
        truncate_chars(&request.title, TITLE_MAX_CHARS)
    };

    let (privacy_status, publish_at) = match request.publish_at {
        None => ("public", None),
        Some(at) => ("private", Some(format_publish_at(at))),
    };

    UploadBody {
        snippet: Snippet {
            title,
            description: truncate_chars(&request.description, DESCRIPTION_MAX_CHARS),
            tags: request.tags.clone(),
            category_id: CATEGORY_PEOPLE_AND_BLOGS.to_string(),
        },
        status: UploadStatus {
            privacy_status,
            publish_at,
            self_declared_made_for_kids: false,
        },
    }
}

/// RFC3339 UTC with a trailing `Z`, the form the platform expects.
fn format_publish_at(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// `Content-Range` header value for one resumable chunk.
fn content_range(offset: u64, chunk_len: usize, total: u64) -> String {
    format!(
        "bytes {}-{}/{}",
        offset,
        offset + chunk_len as u64 - 1,
        total
    )
}

/// YouTube Data API client for a user's connected account.
pub struct YouTubeClient {
    http: Client,
    credentials: Arc<CredentialStore>,
    upload_base: String,
    chunk_size: usize,
}

impl YouTubeClient {
    pub fn new(credentials: Arc<CredentialStore>) -> PublishResult<Self> {
        let http = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .user_agent(concat!("autopub-publish/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            credentials,
            upload_base: DEFAULT_UPLOAD_BASE.to_string(),
            chunk_size: UPLOAD_CHUNK_SIZE,
        })
    }

    /// Point the client at a different API host (tests).
    pub fn with_upload_base(mut self, base: impl Into<String>) -> Self {
        self.upload_base = base.into();
        self
    }

    /// Override the resumable chunk size (tests).
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Upload a finished video on behalf of `user`; returns the remote
    /// video id. Thumbnail attach afterwards is best-effort.
    pub async fn upload(
        &self,
        user: &UserId,
        video: &Path,
        request: &PublishRequest,
    ) -> PublishResult<String> {
        let token = self
            .credentials
            .access_token(user, Provider::Youtube)
            .await?;

        let total = tokio::fs::metadata(video).await?.len();
        let session_url = self.open_session(&token, total, request).await?;
        let video_id = self.send_chunks(&token, &session_url, video, total).await?;

        info!(user = %user, video_id, "YouTube upload complete");

        if let Some(thumbnail) = &request.thumbnail {
            if thumbnail.exists() {
                if let Err(e) = self.set_thumbnail(&token, &video_id, thumbnail).await {
                    warn!(video_id, error = %e, "Thumbnail attach failed, continuing");
                }
            }
        }

        Ok(video_id)
    }

    /// Open a resumable upload session; returns the session URL.
    async fn open_session(
        &self,
        token: &str,
        total: u64,
        request: &PublishRequest,
    ) -> PublishResult<String> {
        let body = build_metadata(request);
        let url = format!(
            "{}/videos?uploadType=resumable&part=snippet,status",
            self.upload_base
        );
        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .header("X-Upload-Content-Type", "video/*")
            .header("X-Upload-Content-Length", total.to_string())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PublishError::provider(
                Provider::Youtube,
                status.as_u16(),
                detail,
            ));
        }

        response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .ok_or_else(|| {
                PublishError::provider(
                    Provider::Youtube,
                    status.as_u16(),
                    "resumable session missing Location header",
                )
            })
    }

    /// Send the media body chunk by chunk; 308 continues the session,
    /// success is only the final response carrying the video id.
    async fn send_chunks(
        &self,
        token: &str,
        session_url: &str,
        video: &Path,
        total: u64,
    ) -> PublishResult<String> {
        let mut file = File::open(video).await?;
        let mut offset: u64 = 0;
        let mut buf = vec![0u8; self.chunk_size];

        loop {
            let read = file.read(&mut buf).await?;
            if read == 0 {
                // Zero-length video would have errored on open_session;
                // an early EOF here means the file shrank under us
                return Err(PublishError::provider(
                    Provider::Youtube,
                    0,
                    "media body ended before the declared length",
                ));
            }

            let range = content_range(offset, read, total);
            debug!(range = %range, "Uploading chunk");

            let response = self
                .http
                .put(session_url)
                .bearer_auth(token)
                .header(reqwest::header::CONTENT_RANGE, range)
                .header(reqwest::header::CONTENT_LENGTH, read.to_string())
                .body(buf[..read].to_vec())
                .send()
                .await?;

            let status = response.status();
            offset += read as u64;

            if status.as_u16() == 308 {
                continue;
            }
            if status.is_success() {
                let parsed: UploadResponse = response.json().await?;
                return Ok(parsed.id);
            }

            let detail = response.text().await.unwrap_or_default();
            return Err(PublishError::provider(
                Provider::Youtube,
                status.as_u16(),
                detail,
            ));
        }
    }

    /// Attach a custom thumbnail to an uploaded video.
    async fn set_thumbnail(
        &self,
        token: &str,
        video_id: &str,
        thumbnail: &Path,
    ) -> PublishResult<()> {
        let bytes = tokio::fs::read(thumbnail).await?;
        let content_type = match thumbnail.extension().and_then(|e| e.to_str()) {
            Some("png") => "image/png",
            _ => "image/jpeg",
        };

        let response = self
            .http
            .post(format!("{}/thumbnails/set", self.upload_base))
            .query(&[("videoId", video_id)])
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PublishError::provider(
                Provider::Youtube,
                status.as_u16(),
                detail,
            ));
        }
        Ok(())
    }
}
