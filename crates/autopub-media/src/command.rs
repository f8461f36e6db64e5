//! FFmpeg command builder and runner.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{RenderError, RenderResult};

/// How much captured stderr to keep in an error message.
const STDERR_TAIL_BYTES: usize = 2048;

/// Builder for FFmpeg invocations with one or more inputs.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Inputs in order: per-input args (before `-i`) and the path
    inputs: Vec<(Vec<String>, PathBuf)>,
    /// Output file path
    output: PathBuf,
    /// Output arguments (after the inputs)
    output_args: Vec<String>,
    /// Whether to overwrite output
    overwrite: bool,
    /// Log level
    log_level: String,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command producing `output`.
    pub fn new(output: impl AsRef<Path>) -> Self {
        Self {
            inputs: Vec::new(),
            output: output.as_ref().to_path_buf(),
            output_args: Vec::new(),
            overwrite: true,
            log_level: "error".to_string(),
        }
    }

    /// Add a plain input.
    pub fn input(mut self, path: impl AsRef<Path>) -> Self {
        self.inputs.push((Vec::new(), path.as_ref().to_path_buf()));
        self
    }

    /// Add a still image input looped for the whole output duration.
    pub fn looped_image_input(mut self, path: impl AsRef<Path>) -> Self {
        self.inputs.push((
            vec!["-loop".to_string(), "1".to_string()],
            path.as_ref().to_path_buf(),
        ));
        self
    }

    /// Add an output argument.
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set video filter.
    pub fn video_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-vf").output_arg(filter)
    }

    /// Set video codec.
    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    /// Set audio codec.
    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:a").output_arg(codec)
    }

    /// Set encoder preset.
    pub fn preset(self, preset: impl Into<String>) -> Self {
        self.output_arg("-preset").output_arg(preset)
    }

    /// Set output frame rate.
    pub fn frame_rate(self, fps: u32) -> Self {
        self.output_arg("-r").output_arg(fps.to_string())
    }

    /// Set output pixel format.
    pub fn pixel_format(self, format: impl Into<String>) -> Self {
        self.output_arg("-pix_fmt").output_arg(format)
    }

    /// Cap the output duration.
    pub fn duration(self, seconds: f64) -> Self {
        self.output_arg("-t").output_arg(format!("{:.3}", seconds))
    }

    /// Set log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Output path this command produces.
    pub fn output_path(&self) -> &Path {
        &self.output
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.overwrite {
            args.push("-y".to_string());
        }

        args.push("-v".to_string());
        args.push(self.log_level.clone());

        for (input_args, path) in &self.inputs {
            args.extend(input_args.clone());
            args.push("-i".to_string());
            args.push(path.to_string_lossy().to_string());
        }

        args.extend(self.output_args.clone());
        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// Runner for FFmpeg commands.
///
/// Captures stderr so encode failures carry the encoder's own
/// diagnostic instead of a bare exit code.
#[derive(Debug, Default)]
pub struct FfmpegRunner {
    /// Timeout in seconds
    timeout_secs: Option<u64>,
}

impl FfmpegRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Run an FFmpeg command to completion.
    pub async fn run(&self, cmd: &FfmpegCommand) -> RenderResult<()> {
        which::which("ffmpeg").map_err(|_| RenderError::FfmpegNotFound)?;

        let args = cmd.build_args();
        debug!("Running FFmpeg: ffmpeg {}", args.join(" "));

        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()?;

        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| RenderError::encode_failed("stderr not captured", None))?;
        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf).await;
            buf
        });

        let status = match self.timeout_secs {
            Some(timeout_secs) => {
                let wait = tokio::time::timeout(
                    std::time::Duration::from_secs(timeout_secs),
                    child.wait(),
                );
                match wait.await {
                    Ok(result) => result?,
                    Err(_) => {
                        warn!(
                            "FFmpeg timed out after {} seconds, killing process",
                            timeout_secs
                        );
                        let _ = child.kill().await;
                        return Err(RenderError::Timeout(timeout_secs));
                    }
                }
            }
            None => child.wait().await?,
        };

        let stderr_buf = stderr_task.await.unwrap_or_default();

        if status.success() {
            Ok(())
        } else {
            let tail_start = stderr_buf.len().saturating_sub(STDERR_TAIL_BYTES);
            let detail = String::from_utf8_lossy(&stderr_buf[tail_start..])
                .trim()
                .to_string();
            let detail = if detail.is_empty() {
                "FFmpeg exited with non-zero status".to_string()
            } else {
                detail
            };
            Err(RenderError::encode_failed(detail, status.code()))
        }
    }
}

/// Check if FFmpeg is available.
pub fn check_ffmpeg() -> RenderResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| RenderError::FfmpegNotFound)
}

/// Check if FFprobe is available.
pub fn check_ffprobe() -> RenderResult<PathBuf> {
    which::which("ffprobe").map_err(|_| RenderError::FfprobeNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_builder_ordering() {
        let cmd = FfmpegCommand::new("out.mp4")
            .looped_image_input("thumb.jpg")
            .input("voice.mp3")
            .video_codec("libx264")
            .preset("veryfast")
            .frame_rate(24)
            .duration(12.5);

        let args = cmd.build_args();

        // Inputs appear in order, each with its own -i
        let loop_pos = args.iter().position(|a| a == "-loop").unwrap();
        let first_i = args.iter().position(|a| a == "-i").unwrap();
        assert!(loop_pos < first_i);
        assert_eq!(args.iter().filter(|a| *a == "-i").count(), 2);

        // Output args come after all inputs, output path last
        let codec_pos = args.iter().position(|a| a == "-c:v").unwrap();
        let mp3_pos = args.iter().position(|a| a == "voice.mp3").unwrap();
        assert!(codec_pos > mp3_pos);
        assert_eq!(args.last().unwrap(), "out.mp4");

        assert!(args.contains(&"-t".to_string()));
        assert!(args.contains(&"12.500".to_string()));
        assert!(args.contains(&"24".to_string()));
    }

    #[test]
    fn test_overwrite_and_log_level_defaults() {
        let args = FfmpegCommand::new("out.mp4").input("in.mp4").build_args();
        assert_eq!(args[0], "-y");
        assert!(args.contains(&"error".to_string()));
    }
}
