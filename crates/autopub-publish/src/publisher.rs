//! Publisher façade: primary YouTube target plus best-effort Drive copy.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use autopub_models::UserId;

use crate::credentials::CredentialStore;
use crate::drive::DriveClient;
use crate::error::PublishResult;
use crate::youtube::YouTubeClient;

/// Everything the Publisher needs besides the media file itself.
#[derive(Debug, Clone)]
pub struct PublishRequest {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    /// Absent = publish immediately (public); present = upload private
    /// with a scheduled flip to public.
    pub publish_at: Option<DateTime<Utc>>,
    /// Optional custom thumbnail, attached best-effort.
    pub thumbnail: Option<PathBuf>,
}

/// Uploads a finished video to the user's connected accounts.
///
/// YouTube decides the outcome; the Drive copy never does. A user who
/// never connected Drive just doesn't get the copy.
pub struct Publisher {
    youtube: YouTubeClient,
    drive: DriveClient,
}

impl Publisher {
    pub fn new(credentials: Arc<CredentialStore>) -> PublishResult<Self> {
        Ok(Self {
            youtube: YouTubeClient::new(Arc::clone(&credentials))?,
            drive: DriveClient::new(credentials)?,
        })
    }

    /// Assemble from pre-configured clients (tests).
    pub fn with_clients(youtube: YouTubeClient, drive: DriveClient) -> Self {
        Self { youtube, drive }
    }

    /// Publish `video` for `user`; returns the YouTube video id.
    pub async fn publish(
        &self,
        user: &UserId,
        video: &Path,
        request: &PublishRequest,
    ) -> PublishResult<String> {
        let video_id = self.youtube.upload(user, video, request).await?;

        // Secondary copy is strictly best-effort
        match self.drive.upload(user, video).await {
            Ok(link) => info!(user = %user, link, "Secondary Drive copy stored"),
            Err(e) if e.is_not_connected() => {
                debug!(user = %user, "Drive not connected, skipping secondary copy")
            }
            Err(e) => warn!(user = %user, error = %e, "Drive copy failed, continuing"),
        }

        Ok(video_id)
    }
}
