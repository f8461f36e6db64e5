//! Service seams between the runner and the pipeline stages.
//!
//! The runner only sees these traits; production wiring lives in
//! [`production`] and tests substitute mocks.

use std::path::Path;

use async_trait::async_trait;

use autopub_models::UserId;
use autopub_publish::PublishRequest;

/// Speech synthesis stage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechService: Send + Sync {
    async fn synthesize(
        &self,
        text: &str,
        voice: &str,
        speed: f64,
        out: &Path,
    ) -> Result<(), autopub_tts::SynthesisError>;
}

/// Video composition stage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RenderService: Send + Sync {
    async fn compose(
        &self,
        image: &Path,
        audio: &Path,
        out: &Path,
    ) -> Result<(), autopub_media::RenderError>;
}

/// Publication stage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PublishService: Send + Sync {
    async fn publish(
        &self,
        user: &UserId,
        video: &Path,
        request: &PublishRequest,
    ) -> Result<String, autopub_publish::PublishError>;
}

/// Best-effort notification sink; delivery failure never affects a job.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotifySink: Send + Sync {
    async fn notify(&self, recipient: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

/// Production implementations wiring the sibling crates.
pub mod production {
    use super::*;

    use autopub_publish::Publisher;
    use autopub_tts::{SpeechRequest, SpeechSynthesizer};

    /// Engine-backed synthesis.
    pub struct PipelineSpeech {
        synthesizer: SpeechSynthesizer,
    }

    impl PipelineSpeech {
        pub fn new(synthesizer: SpeechSynthesizer) -> Self {
            Self { synthesizer }
        }
    }

    #[async_trait]
    impl SpeechService for PipelineSpeech {
        async fn synthesize(
            &self,
            text: &str,
            voice: &str,
            speed: f64,
            out: &Path,
        ) -> Result<(), autopub_tts::SynthesisError> {
            let request = SpeechRequest::new(text, voice, speed);
            self.synthesizer.synthesize(&request, out).await
        }
    }

    /// FFmpeg-backed composition.
    pub struct PipelineRender;

    #[async_trait]
    impl RenderService for PipelineRender {
        async fn compose(
            &self,
            image: &Path,
            audio: &Path,
            out: &Path,
        ) -> Result<(), autopub_media::RenderError> {
            autopub_media::compose(image, audio, out).await
        }
    }

    /// Publisher-facade-backed publication.
    pub struct PipelinePublish {
        publisher: Publisher,
    }

    impl PipelinePublish {
        pub fn new(publisher: Publisher) -> Self {
            Self { publisher }
        }
    }

    #[async_trait]
    impl PublishService for PipelinePublish {
        async fn publish(
            &self,
            user: &UserId,
            video: &Path,
            request: &PublishRequest,
        ) -> Result<String, autopub_publish::PublishError> {
            self.publisher.publish(user, video, request).await
        }
    }
}
