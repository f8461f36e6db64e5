//! AutoPub job runner.
//!
//! A single sequential control loop claims the oldest eligible job and
//! drives it through synthesis, render and publication, persisting the
//! status after every transition and isolating failures per job.

pub mod config;
pub mod error;
pub mod notify;
pub mod processor;
pub mod runner;
pub mod services;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use notify::WebhookNotifier;
pub use processor::{run_claimed, ProcessingContext};
pub use runner::{ensure_started, JobRunner, RunnerHandle};
pub use services::{NotifySink, PublishService, RenderService, SpeechService};
