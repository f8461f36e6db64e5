//! Worker configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Root data directory (persistent when the host mounts one)
    pub data_dir: PathBuf,
    /// Idle sleep between store polls
    pub poll_interval: Duration,
    /// Back-off after a store error before polling again
    pub store_backoff: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            poll_interval: Duration::from_secs(1),
            store_backoff: Duration::from_secs(5),
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            data_dir: std::env::var("AUTOPUB_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
            poll_interval: Duration::from_millis(
                std::env::var("WORKER_POLL_INTERVAL_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(1000),
            ),
            store_backoff: Duration::from_secs(
                std::env::var("WORKER_STORE_BACKOFF_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
        }
    }

    /// Media artifact root.
    pub fn storage_dir(&self) -> PathBuf {
        self.data_dir.join("storage")
    }

    /// Directory for synthesized audio artifacts.
    pub fn audio_dir(&self) -> PathBuf {
        self.storage_dir().join("audio")
    }

    /// Directory for rendered video artifacts.
    pub fn video_dir(&self) -> PathBuf {
        self.storage_dir().join("video")
    }

    /// Per-user OAuth token root.
    pub fn tokens_dir(&self) -> PathBuf {
        self.data_dir.join("tokens")
    }

    /// Deterministic audio artifact path for a job.
    pub fn audio_artifact(&self, job_id: impl AsRef<Path>) -> PathBuf {
        self.audio_dir().join(job_id.as_ref()).with_extension("mp3")
    }

    /// Deterministic video artifact path for a job.
    pub fn video_artifact(&self, job_id: impl AsRef<Path>) -> PathBuf {
        self.video_dir().join(job_id.as_ref()).with_extension("mp4")
    }

    /// Create the artifact and token directories.
    pub async fn ensure_dirs(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(self.audio_dir()).await?;
        tokio::fs::create_dir_all(self.video_dir()).await?;
        tokio::fs::create_dir_all(self.tokens_dir()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_paths_derive_from_job_id() {
        let config = WorkerConfig {
            data_dir: PathBuf::from("/data"),
            ..Default::default()
        };
        assert_eq!(
            config.audio_artifact("job-1"),
            PathBuf::from("/data/storage/audio/job-1.mp3")
        );
        assert_eq!(
            config.video_artifact("job-1"),
            PathBuf::from("/data/storage/video/job-1.mp4")
        );
        assert_eq!(config.tokens_dir(), PathBuf::from("/data/tokens"));
    }

    #[tokio::test]
    async fn test_ensure_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let config = WorkerConfig {
            data_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        config.ensure_dirs().await.unwrap();
        assert!(config.audio_dir().is_dir());
        assert!(config.video_dir().is_dir());
        assert!(config.tokens_dir().is_dir());
    }
}
