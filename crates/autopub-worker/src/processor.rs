//! Per-job pipeline.
//!
//! One claimed job is driven Rendering -> Done -> Uploading -> terminal,
//! with a store commit after every transition so an external observer
//! always sees an accurate in-flight status. Any error is caught once,
//! at [`run_claimed`], and becomes a terminal `FAILED` status.

use std::sync::Arc;

use tracing::{error, info, warn};

use autopub_models::{Job, JobStatus};
use autopub_publish::PublishRequest;
use autopub_store::JobStore;

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::services::{NotifySink, PublishService, RenderService, SpeechService};

/// Shared context for job processing.
pub struct ProcessingContext {
    pub config: WorkerConfig,
    pub store: Arc<dyn JobStore>,
    pub speech: Arc<dyn SpeechService>,
    pub render: Arc<dyn RenderService>,
    pub publish: Arc<dyn PublishService>,
    pub notify: Arc<dyn NotifySink>,
}

/// Process one claimed job to a terminal status.
///
/// Never returns an error: failures convert the job to `FAILED` with
/// the cause as progress detail, and a commit failure at that point can
/// only be logged.
pub async fn run_claimed(ctx: &ProcessingContext, mut job: Job) {
    let job_id = job.id.clone();
    info!(job_id = %job_id, title = %job.title, "Processing job");

    match process_job(ctx, &mut job).await {
        Ok(()) => {
            info!(job_id = %job_id, status = %job.status, "Job finished");
        }
        Err(e) => {
            error!(job_id = %job_id, error = %e, "Job failed");
            if let Err(status_err) = job.fail(e.to_string()) {
                // Only possible if the job already reached a terminal
                // status, which process_job never leaves on error
                error!(job_id = %job_id, error = %status_err, "Could not mark job failed");
                return;
            }
            if let Err(commit_err) = ctx.store.commit(&job).await {
                error!(job_id = %job_id, error = %commit_err, "Could not persist failed status");
            }
        }
    }
}

/// The pipeline proper; every `?` here is one failure path into
/// [`run_claimed`]'s single catch.
async fn process_job(ctx: &ProcessingContext, job: &mut Job) -> WorkerResult<()> {
    // The thumbnail gates the queue: nothing is synthesized for a job
    // whose image can't be read
    ensure_thumbnail_readable(job).await?;

    job.advance(JobStatus::Rendering, "Synthèse audio + rendu vidéo…")?;
    ctx.store.commit(job).await?;

    // 1) Speech synthesis
    let audio_path = ctx.config.audio_artifact(job.id.as_str());
    ctx.speech
        .synthesize(&job.script_text, &job.voice, job.speed, &audio_path)
        .await?;
    job.set_audio_path(&audio_path);
    ctx.store.commit(job).await?;

    // 2) Video render
    let video_path = ctx.config.video_artifact(job.id.as_str());
    ctx.render
        .compose(&job.thumbnail_path, &audio_path, &video_path)
        .await?;
    job.set_video_path(&video_path);
    ctx.store.commit(job).await?;

    // 3) Locally ready
    job.advance(
        JobStatus::Done,
        "Vidéo prête localement. Passage à l'upload YouTube…",
    )?;
    ctx.store.commit(job).await?;

    // 4) Upload
    job.advance(JobStatus::Uploading, "Envoi vers YouTube…")?;
    ctx.store.commit(job).await?;

    let request = PublishRequest {
        title: job.title.clone(),
        description: job.description.clone(),
        tags: job.tags.clone(),
        publish_at: job.publish_at,
        thumbnail: Some(job.thumbnail_path.clone()),
    };
    let video_id = ctx
        .publish
        .publish(&job.user_id, &video_path, &request)
        .await?;
    job.set_youtube_video_id(&video_id);

    match job.publish_at {
        None => job.advance(
            JobStatus::Published,
            "Vidéo publiée immédiatement sur YouTube.",
        )?,
        Some(at) => job.advance(
            JobStatus::Scheduled,
            format!(
                "Uploadée en privé. Publication programmée pour {} UTC.",
                at.format("%Y-%m-%d %H:%M:%S")
            ),
        )?,
    }
    ctx.store.commit(job).await?;

    // 5) Best-effort owner notification
    notify_owner(ctx, job).await;

    Ok(())
}

async fn ensure_thumbnail_readable(job: &Job) -> WorkerResult<()> {
    match tokio::fs::metadata(&job.thumbnail_path).await {
        Ok(meta) if meta.is_file() => Ok(()),
        _ => Err(WorkerError::UnreadableThumbnail(job.thumbnail_path.clone())),
    }
}

/// Tell the owner how their job ended. Failures are swallowed; the job
/// status is already terminal.
async fn notify_owner(ctx: &ProcessingContext, job: &Job) {
    let address = match ctx.store.contact_for(&job.user_id).await {
        Ok(Some(address)) => address,
        Ok(None) => return,
        Err(e) => {
            warn!(job_id = %job.id, error = %e, "Contact lookup failed, skipping notification");
            return;
        }
    };

    let video_id = job.youtube_video_id.as_deref().unwrap_or("—");
    let body = format!(
        "Titre: {}\nStatut: {}\nMessage: {}\nYouTube: https://youtube.com/watch?v={}",
        job.title, job.status, job.progress_msg, video_id
    );

    if let Err(e) = ctx
        .notify
        .notify(&address, "AutoPub — Vidéo envoyée sur YouTube", &body)
        .await
    {
        warn!(job_id = %job.id, error = %e, "Notification failed, continuing");
    }
}
