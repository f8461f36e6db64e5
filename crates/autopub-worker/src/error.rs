//! Worker error types.

use std::path::PathBuf;

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

/// Everything that can abort one job's pipeline.
///
/// Caught exactly once at the job-processing boundary and converted to
/// a terminal `FAILED` status; never propagated out of the runner loop.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Miniature introuvable ou illisible: {0}")]
    UnreadableThumbnail(PathBuf),

    #[error("Synthèse vocale échouée: {0}")]
    Synthesis(#[from] autopub_tts::SynthesisError),

    #[error("Rendu vidéo échoué: {0}")]
    Render(#[from] autopub_media::RenderError),

    #[error("Upload échoué: {0}")]
    Publish(#[from] autopub_publish::PublishError),

    #[error("Store error: {0}")]
    Store(#[from] autopub_store::StoreError),

    #[error("Status error: {0}")]
    Status(#[from] autopub_models::StatusError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
