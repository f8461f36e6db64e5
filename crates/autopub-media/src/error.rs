//! Error types for render operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while composing a video.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("Encoding failed: {detail}")]
    EncodeFailed {
        detail: String,
        exit_code: Option<i32>,
    },

    #[error("Probe failed: {detail}")]
    ProbeFailed { detail: String },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Invalid media: {0}")]
    InvalidMedia(String),

    #[error("Encoding timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl RenderError {
    pub fn encode_failed(detail: impl Into<String>, exit_code: Option<i32>) -> Self {
        Self::EncodeFailed {
            detail: detail.into(),
            exit_code,
        }
    }

    pub fn probe_failed(detail: impl Into<String>) -> Self {
        Self::ProbeFailed {
            detail: detail.into(),
        }
    }

    pub fn invalid_media(detail: impl Into<String>) -> Self {
        Self::InvalidMedia(detail.into())
    }
}
