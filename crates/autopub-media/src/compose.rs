//! Still-image video composition.
//!
//! The image is fitted onto an opaque black 1920x1080 canvas without
//! distortion, then muxed against the audio track for exactly the audio
//! duration at a fixed frame rate.

use std::path::Path;

use tracing::{debug, info};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{RenderError, RenderResult};
use crate::probe::{audio_duration, image_dimensions};

/// Output canvas width.
pub const TARGET_WIDTH: u32 = 1920;
/// Output canvas height.
pub const TARGET_HEIGHT: u32 = 1080;
/// Output frame rate.
pub const FRAME_RATE: u32 = 24;

/// Aspect ratios closer than this are treated as matching.
const RATIO_TOLERANCE: f64 = 1e-3;

/// Encoding a still frame against audio is cheap; anything past this is
/// a hung encoder.
const ENCODE_TIMEOUT_SECS: u64 = 1800;

/// How a source image maps onto the target canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasFit {
    /// Ratio already matches; plain scale to the canvas
    Exact,
    /// Relatively wider: scale to canvas width, black bars top/bottom
    Letterbox { scaled_width: u32, scaled_height: u32 },
    /// Relatively taller: scale to canvas height, black bars left/right
    Pillarbox { scaled_width: u32, scaled_height: u32 },
}

impl CanvasFit {
    /// Scaled content dimensions inside the canvas.
    pub fn scaled(&self) -> (u32, u32) {
        match *self {
            CanvasFit::Exact => (TARGET_WIDTH, TARGET_HEIGHT),
            CanvasFit::Letterbox {
                scaled_width,
                scaled_height,
            }
            | CanvasFit::Pillarbox {
                scaled_width,
                scaled_height,
            } => (scaled_width, scaled_height),
        }
    }
}

/// Decide how an image of the given dimensions fits the target canvas.
pub fn plan_canvas(width: u32, height: u32) -> RenderResult<CanvasFit> {
    if width == 0 || height == 0 {
        return Err(RenderError::invalid_media(format!(
            "degenerate image dimensions {}x{}",
            width, height
        )));
    }

    let image_ratio = width as f64 / height as f64;
    let target_ratio = TARGET_WIDTH as f64 / TARGET_HEIGHT as f64;

    if (image_ratio - target_ratio).abs() < RATIO_TOLERANCE {
        return Ok(CanvasFit::Exact);
    }

    if image_ratio > target_ratio {
        let scaled_height = (TARGET_WIDTH as f64 / image_ratio).round() as u32;
        Ok(CanvasFit::Letterbox {
            scaled_width: TARGET_WIDTH,
            scaled_height: scaled_height.min(TARGET_HEIGHT),
        })
    } else {
        let scaled_width = (TARGET_HEIGHT as f64 * image_ratio).round() as u32;
        Ok(CanvasFit::Pillarbox {
            scaled_width: scaled_width.min(TARGET_WIDTH),
            scaled_height: TARGET_HEIGHT,
        })
    }
}

/// Build the scale/pad filter realizing a [`CanvasFit`].
pub fn fit_filter(fit: CanvasFit) -> String {
    let (scaled_width, scaled_height) = fit.scaled();
    match fit {
        CanvasFit::Exact => format!(
            "scale={}:{}:flags=lanczos",
            TARGET_WIDTH, TARGET_HEIGHT
        ),
        CanvasFit::Letterbox { .. } | CanvasFit::Pillarbox { .. } => format!(
            "scale={}:{}:flags=lanczos,pad={}:{}:(ow-iw)/2:(oh-ih)/2:black",
            scaled_width, scaled_height, TARGET_WIDTH, TARGET_HEIGHT
        ),
    }
}

/// Compose a still image and an audio artifact into a finished video.
///
/// Either a complete playable file exists at `out` afterwards or the
/// call fails and any truncated output has been removed.
pub async fn compose(
    image: impl AsRef<Path>,
    audio: impl AsRef<Path>,
    out: impl AsRef<Path>,
) -> RenderResult<()> {
    let image = image.as_ref();
    let audio = audio.as_ref();
    let out = out.as_ref();

    let (width, height) = image_dimensions(image).await?;
    let fit = plan_canvas(width, height)?;
    let duration = audio_duration(audio).await?;

    debug!(
        image = %image.display(),
        source = format!("{}x{}", width, height),
        fit = ?fit,
        duration,
        "Composing video"
    );

    if let Some(parent) = out.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let cmd = FfmpegCommand::new(out)
        .looped_image_input(image)
        .input(audio)
        .video_filter(fit_filter(fit))
        .video_codec("libx264")
        .preset("veryfast")
        .audio_codec("aac")
        .frame_rate(FRAME_RATE)
        .pixel_format("yuv420p")
        .duration(duration)
        .output_args(["-movflags", "+faststart"]);

    let runner = FfmpegRunner::new().with_timeout(ENCODE_TIMEOUT_SECS);
    if let Err(e) = runner.run(&cmd).await {
        // Never leave a truncated artifact behind
        let _ = tokio::fs::remove_file(out).await;
        return Err(e);
    }

    info!(out = %out.display(), duration, "Video composed");
    Ok(())
}
