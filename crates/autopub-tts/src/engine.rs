//! Engine trait and the ordered-fallback synthesizer façade.

use std::path::Path;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::{SynthesisError, SynthesisResult};
use crate::fallback::TranslateEngine;
use crate::neural::NeuralEngine;

/// One synthesis request.
#[derive(Debug, Clone)]
pub struct SpeechRequest {
    /// Raw script text (engines sanitize as they need)
    pub text: String,
    /// Voice identifier, e.g. `fr-FR-DeniseNeural`
    pub voice: String,
    /// Speed multiplier, 1.0 = natural
    pub speed: f64,
}

impl SpeechRequest {
    pub fn new(text: impl Into<String>, voice: impl Into<String>, speed: f64) -> Self {
        Self {
            text: text.into(),
            voice: voice.into(),
            speed,
        }
    }
}

/// A single synthesis backend.
#[async_trait]
pub trait SynthesisEngine: Send + Sync {
    /// Short engine name used in logs and error summaries.
    fn name(&self) -> &'static str;

    /// Synthesize `request` into an audio file at `out`.
    async fn synthesize(&self, request: &SpeechRequest, out: &Path) -> SynthesisResult<()>;
}

/// Ordered list of engines; the first success short-circuits.
///
/// Failure causes are kept per engine for logging, and the call only
/// fails once every candidate has failed. The primary engine is never
/// retried within one call.
pub struct SpeechSynthesizer {
    engines: Vec<Box<dyn SynthesisEngine>>,
}

impl SpeechSynthesizer {
    pub fn new(engines: Vec<Box<dyn SynthesisEngine>>) -> Self {
        Self { engines }
    }

    /// Default engine order: streaming neural first, translate fallback
    /// second.
    pub fn from_env() -> SynthesisResult<Self> {
        Ok(Self::new(vec![
            Box::new(NeuralEngine::from_env()?),
            Box::new(TranslateEngine::new()?),
        ]))
    }

    /// Synthesize to `out`, falling back through the engine list.
    pub async fn synthesize(&self, request: &SpeechRequest, out: &Path) -> SynthesisResult<()> {
        let mut causes: Vec<String> = Vec::new();

        for engine in &self.engines {
            match engine.synthesize(request, out).await {
                Ok(()) => {
                    info!(
                        engine = engine.name(),
                        voice = %request.voice,
                        out = %out.display(),
                        "Synthesis complete"
                    );
                    return Ok(());
                }
                Err(e) => {
                    warn!(
                        engine = engine.name(),
                        error = %e,
                        "Synthesis engine failed, trying next"
                    );
                    causes.push(format!("{}: {}", engine.name(), e));
                    // A failed attempt may leave a partial file behind
                    let _ = tokio::fs::remove_file(out).await;
                }
            }
        }

        Err(SynthesisError::AllEnginesFailed {
            summary: causes.join("; "),
        })
    }
}
