//! Job record: one request to turn a script and a still image into a
//! published video.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::status::{JobStatus, StatusError};

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the user owning a job. Exactly one user per job; a job
/// is never shared or reassigned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A narrated-video job.
///
/// Content fields are set once by the submission layer and never
/// rewritten by the pipeline; the pipeline only writes the derived
/// artifact references and the status/progress pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Unique job ID
    pub id: JobId,

    /// Owning user
    pub user_id: UserId,

    /// Video title
    pub title: String,

    /// Video description
    #[serde(default)]
    pub description: String,

    /// Tag list
    #[serde(default)]
    pub tags: Vec<String>,

    /// Script to narrate
    pub script_text: String,

    /// Voice identifier (e.g. `fr-FR-DeniseNeural`)
    pub voice: String,

    /// Speech speed multiplier (1.0 = natural)
    pub speed: f64,

    /// Still image shown for the whole video; must exist and be readable
    /// before the job may leave the queue
    pub thumbnail_path: PathBuf,

    /// Target publish time; absent = publish immediately
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_at: Option<DateTime<Utc>>,

    /// Synthesized audio artifact, written by the pipeline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_path: Option<PathBuf>,

    /// Rendered video artifact, written by the pipeline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_path: Option<PathBuf>,

    /// Remote platform video identifier, written by the pipeline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube_video_id: Option<String>,

    /// Job status
    #[serde(default)]
    pub status: JobStatus,

    /// Human-readable status detail, overwritten at every transition.
    /// Display only, never authoritative.
    #[serde(default)]
    pub progress_msg: String,

    /// Creation timestamp; FIFO ordering key
    pub created_at: DateTime<Utc>,

    /// Last mutation timestamp
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Create a new queued job with the required content fields.
    ///
    /// Voice and speed get the submission layer's defaults; use the
    /// `with_*` builders to override.
    pub fn new(
        user_id: UserId,
        title: impl Into<String>,
        script_text: impl Into<String>,
        thumbnail_path: impl Into<PathBuf>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            user_id,
            title: title.into(),
            description: String::new(),
            tags: Vec::new(),
            script_text: script_text.into(),
            voice: "fr-FR-DeniseNeural".to_string(),
            speed: 1.3,
            thumbnail_path: thumbnail_path.into(),
            publish_at: None,
            audio_path: None,
            video_path: None,
            youtube_video_id: None,
            status: JobStatus::Ready,
            progress_msg: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_publish_at(mut self, publish_at: Option<DateTime<Utc>>) -> Self {
        self.publish_at = publish_at;
        self
    }

    /// Whether publication was requested for a future time.
    pub fn is_scheduled(&self) -> bool {
        self.publish_at.is_some()
    }

    /// Advance the status, recording a progress message.
    ///
    /// Rejects illegal transitions; the caller persists the job after
    /// every successful advance.
    pub fn advance(
        &mut self,
        to: JobStatus,
        progress_msg: impl Into<String>,
    ) -> Result<(), StatusError> {
        self.status = self.status.transition(to)?;
        self.progress_msg = progress_msg.into();
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Convert the job to `Failed`, recording the cause.
    ///
    /// Legal from any non-terminal status; a no-op error on terminal
    /// jobs is surfaced to the caller.
    pub fn fail(&mut self, cause: impl Into<String>) -> Result<(), StatusError> {
        self.advance(JobStatus::Failed, cause)
    }

    /// External retry trigger: flip a failed job back into the queue.
    ///
    /// Derived artifacts are cleared so reprocessing restarts from
    /// scratch; content fields are untouched.
    pub fn reset_for_retry(&mut self) -> Result<(), StatusError> {
        self.status = self.status.transition(JobStatus::Retry)?;
        self.audio_path = None;
        self.video_path = None;
        self.youtube_video_id = None;
        self.progress_msg = String::new();
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Record the synthesized audio artifact.
    pub fn set_audio_path(&mut self, path: impl Into<PathBuf>) {
        self.audio_path = Some(path.into());
        self.updated_at = Utc::now();
    }

    /// Record the rendered video artifact.
    pub fn set_video_path(&mut self, path: impl Into<PathBuf>) {
        self.video_path = Some(path.into());
        self.updated_at = Utc::now();
    }

    /// Record the remote platform video identifier.
    pub fn set_youtube_video_id(&mut self, id: impl Into<String>) {
        self.youtube_video_id = Some(id.into());
        self.updated_at = Utc::now();
    }
}
