//! FFmpeg-based video composition for the AutoPub pipeline.
//!
//! Turns a still image plus an audio artifact into a fixed-resolution
//! video: the image is fitted onto an opaque 1920x1080 canvas and held
//! for exactly the audio duration.

pub mod command;
pub mod compose;
pub mod error;
pub mod probe;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use compose::{compose, plan_canvas, CanvasFit, FRAME_RATE, TARGET_HEIGHT, TARGET_WIDTH};
pub use error::{RenderError, RenderResult};
pub use probe::{audio_duration, image_dimensions, probe_media, MediaInfo};
