//! AutoPub worker binary.

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use autopub_publish::{CredentialStore, Publisher};
use autopub_store::InMemoryJobStore;
use autopub_tts::SpeechSynthesizer;
use autopub_worker::services::production::{PipelinePublish, PipelineRender, PipelineSpeech};
use autopub_worker::{ensure_started, ProcessingContext, WebhookNotifier, WorkerConfig};

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter =
        EnvFilter::from_default_env().add_directive("autopub=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting autopub-worker");

    // Load configuration and prepare artifact directories
    let config = WorkerConfig::from_env();
    info!("Worker config: {:?}", config);

    if let Err(e) = config.ensure_dirs().await {
        error!("Failed to create data directories: {}", e);
        std::process::exit(1);
    }

    // The render stage shells out; fail fast when the tools are absent
    for check in [autopub_media::check_ffmpeg(), autopub_media::check_ffprobe()] {
        if let Err(e) = check {
            error!("Media toolchain check failed: {}", e);
            std::process::exit(1);
        }
    }

    // Wire the pipeline services
    let synthesizer = match SpeechSynthesizer::from_env() {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to create speech synthesizer: {}", e);
            std::process::exit(1);
        }
    };

    let credentials = match CredentialStore::new(config.tokens_dir()) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            error!("Failed to create credential store: {}", e);
            std::process::exit(1);
        }
    };

    let publisher = match Publisher::new(credentials) {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to create publisher: {}", e);
            std::process::exit(1);
        }
    };

    let notifier = match WebhookNotifier::from_env() {
        Ok(n) => n,
        Err(e) => {
            error!("Failed to create notifier: {}", e);
            std::process::exit(1);
        }
    };

    let ctx = Arc::new(ProcessingContext {
        config,
        store: Arc::new(InMemoryJobStore::new()),
        speech: Arc::new(PipelineSpeech::new(synthesizer)),
        render: Arc::new(PipelineRender),
        publish: Arc::new(PipelinePublish::new(publisher)),
        notify: Arc::new(notifier),
    });

    let handle = ensure_started(ctx);

    // Run until interrupted; shutdown takes effect between jobs
    tokio::signal::ctrl_c().await.ok();
    info!("Received shutdown signal");
    handle.shutdown();

    info!("Worker shutdown complete");
}
