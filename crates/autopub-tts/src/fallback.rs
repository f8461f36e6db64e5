//! Always-available fallback engine.
//!
//! Uses a translate-style TTS endpoint: no fine-grained rate control,
//! language derived from the voice identifier's locale prefix, text
//! sanitized and fetched in word-boundary chunks appended to one MP3.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::engine::{SpeechRequest, SynthesisEngine};
use crate::error::{SynthesisError, SynthesisResult};
use crate::text::{chunk_text, lang_from_voice, sanitize_text};

const DEFAULT_ENDPOINT: &str = "https://translate.google.com/translate_tts";

/// The endpoint rejects overlong queries; mirror the reference client's
/// chunk size.
const MAX_CHUNK_CHARS: usize = 200;

/// Translate-style TTS fallback client.
pub struct TranslateEngine {
    http: Client,
    endpoint: String,
}

impl TranslateEngine {
    pub fn new() -> SynthesisResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("autopub-tts/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            endpoint: std::env::var("FALLBACK_TTS_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string()),
        })
    }
}

#[async_trait]
impl SynthesisEngine for TranslateEngine {
    fn name(&self) -> &'static str {
        "translate"
    }

    async fn synthesize(&self, request: &SpeechRequest, out: &Path) -> SynthesisResult<()> {
        let lang = lang_from_voice(&request.voice);
        let clean = sanitize_text(&request.text);
        let chunks = chunk_text(&clean, MAX_CHUNK_CHARS);
        // sanitize_text never yields an empty string, but a lone space
        // produces no chunks; keep the single-space contract
        let chunks = if chunks.is_empty() {
            vec![" ".to_string()]
        } else {
            chunks
        };

        debug!(
            lang,
            chunks = chunks.len(),
            out = %out.display(),
            "Fallback synthesis"
        );

        if let Some(parent) = out.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = File::create(out).await?;

        for chunk in &chunks {
            let response = self
                .http
                .get(&self.endpoint)
                .query(&[
                    ("ie", "UTF-8"),
                    ("client", "tw-ob"),
                    ("tl", lang),
                    ("q", chunk.as_str()),
                ])
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                return Err(SynthesisError::rejected(
                    self.name(),
                    status.as_u16(),
                    format!("chunk of {} chars refused", chunk.len()),
                ));
            }

            let bytes = response.bytes().await?;
            file.write_all(&bytes).await?;
        }

        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_name() {
        let engine = TranslateEngine::new().unwrap();
        assert_eq!(engine.name(), "translate");
    }

    #[test]
    fn test_language_and_chunking_inputs() {
        // The pieces the request is assembled from
        assert_eq!(lang_from_voice("fr-FR-HenriNeural"), "fr");
        let clean = sanitize_text("<p>Bonjour</p>   le monde");
        assert_eq!(clean, "Bonjour le monde");
        let chunks = chunk_text(&clean, MAX_CHUNK_CHARS);
        assert_eq!(chunks, vec!["Bonjour le monde"]);
    }
}
