//! FFprobe media information.

use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::error::{RenderError, RenderResult};

/// Probed media file information.
#[derive(Debug, Clone)]
pub struct MediaInfo {
    /// Container duration in seconds (0.0 for still images)
    pub duration: f64,
    /// Width in pixels (0 for pure audio)
    pub width: u32,
    /// Height in pixels (0 for pure audio)
    pub height: u32,
}

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    width: Option<u32>,
    height: Option<u32>,
}

/// Probe a media file.
///
/// Works for audio files, video files, and still images (ffprobe
/// reports an image as a single video stream).
pub async fn probe_media(path: impl AsRef<Path>) -> RenderResult<MediaInfo> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(RenderError::FileNotFound(path.to_path_buf()));
    }

    which::which("ffprobe").map_err(|_| RenderError::FfprobeNotFound)?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(RenderError::probe_failed(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    let probe: FfprobeOutput = serde_json::from_slice(&output.stdout)?;

    let duration = probe
        .format
        .duration
        .as_ref()
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    let visual = probe.streams.iter().find(|s| s.codec_type == "video");

    Ok(MediaInfo {
        duration,
        width: visual.and_then(|s| s.width).unwrap_or(0),
        height: visual.and_then(|s| s.height).unwrap_or(0),
    })
}

/// Duration of an audio artifact in seconds.
pub async fn audio_duration(path: impl AsRef<Path>) -> RenderResult<f64> {
    let path = path.as_ref();
    let info = probe_media(path).await?;
    if info.duration <= 0.0 {
        return Err(RenderError::invalid_media(format!(
            "no playable duration in {}",
            path.display()
        )));
    }
    Ok(info.duration)
}

/// Pixel dimensions of a still image.
pub async fn image_dimensions(path: impl AsRef<Path>) -> RenderResult<(u32, u32)> {
    let path = path.as_ref();
    let info = probe_media(path).await?;
    if info.width == 0 || info.height == 0 {
        return Err(RenderError::invalid_media(format!(
            "no image stream in {}",
            path.display()
        )));
    }
    Ok((info.width, info.height))
}
