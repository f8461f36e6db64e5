//! Streaming neural text-to-speech engine.
//!
//! Speaks to an Azure-style readaloud endpoint: one SSML POST, the MP3
//! body streamed straight to the output artifact.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::engine::{SpeechRequest, SynthesisEngine};
use crate::error::{SynthesisError, SynthesisResult};
use crate::text::{rate_from_speed, sanitize_text, xml_escape};

const DEFAULT_ENDPOINT: &str =
    "https://speech.platform.bing.com/consumer/speech/synthesize/readaloud/v1";
const DEFAULT_OUTPUT_FORMAT: &str = "audio-24khz-48kbitrate-mono-mp3";

/// Neural engine configuration.
#[derive(Debug, Clone)]
pub struct NeuralConfig {
    /// Synthesis endpoint URL
    pub endpoint: String,
    /// Optional subscription key, sent as `Ocp-Apim-Subscription-Key`
    pub api_key: Option<String>,
    /// Requested audio container/bitrate
    pub output_format: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for NeuralConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

impl NeuralConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            endpoint: std::env::var("SPEECH_TTS_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string()),
            api_key: std::env::var("SPEECH_TTS_KEY").ok().filter(|k| !k.is_empty()),
            output_format: std::env::var("SPEECH_TTS_FORMAT")
                .unwrap_or_else(|_| DEFAULT_OUTPUT_FORMAT.to_string()),
            timeout: Duration::from_secs(
                std::env::var("SPEECH_TTS_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(120),
            ),
        }
    }
}

/// Streaming neural TTS client.
pub struct NeuralEngine {
    http: Client,
    config: NeuralConfig,
}

impl NeuralEngine {
    pub fn new(config: NeuralConfig) -> SynthesisResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("autopub-tts/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, config })
    }

    pub fn from_env() -> SynthesisResult<Self> {
        Self::new(NeuralConfig::from_env())
    }

    /// Build the SSML document for one request.
    fn build_ssml(request: &SpeechRequest) -> String {
        let rate = rate_from_speed(request.speed);
        let text = xml_escape(&sanitize_text(&request.text));
        format!(
            "<speak version='1.0' xml:lang='en-US'>\
             <voice name='{voice}'>\
             <prosody rate='{rate}'>{text}</prosody>\
             </voice></speak>",
            voice = request.voice,
            rate = rate,
            text = text,
        )
    }
}

#[async_trait]
impl SynthesisEngine for NeuralEngine {
    fn name(&self) -> &'static str {
        "neural"
    }

    async fn synthesize(&self, request: &SpeechRequest, out: &Path) -> SynthesisResult<()> {
        let ssml = Self::build_ssml(request);
        debug!(endpoint = %self.config.endpoint, voice = %request.voice, "Requesting neural synthesis");

        let mut req = self
            .http
            .post(&self.config.endpoint)
            .header("Content-Type", "application/ssml+xml")
            .header("X-Microsoft-OutputFormat", &self.config.output_format)
            .body(ssml);
        if let Some(key) = &self.config.api_key {
            req = req.header("Ocp-Apim-Subscription-Key", key);
        }

        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(SynthesisError::rejected(
                self.name(),
                status.as_u16(),
                detail,
            ));
        }

        // Write the audio stream to the artifact incrementally
        if let Some(parent) = out.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = File::create(out).await?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        Ok(())
    }
}
