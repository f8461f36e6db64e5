//! Synthesis error types.

use thiserror::Error;

pub type SynthesisResult<T> = Result<T, SynthesisError>;

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("Speech request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{engine} rejected the request (HTTP {status}): {detail}")]
    Rejected {
        engine: &'static str,
        status: u16,
        detail: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("All synthesis engines failed: {summary}")]
    AllEnginesFailed { summary: String },
}

impl SynthesisError {
    pub fn rejected(engine: &'static str, status: u16, detail: impl Into<String>) -> Self {
        Self::Rejected {
            engine,
            status,
            detail: detail.into(),
        }
    }
}
