//! Publish error types.

use thiserror::Error;

use crate::credentials::Provider;

pub type PublishResult<T> = Result<T, PublishError>;

#[derive(Debug, Error)]
pub enum PublishError {
    /// The user never connected this provider, or the stored credential
    /// can no longer be refreshed.
    #[error("No valid {provider} credential for this user")]
    NotConnected { provider: Provider },

    /// The provider rejected or failed the call; status detail kept.
    #[error("{provider} call failed (HTTP {status}): {detail}")]
    Provider {
        provider: Provider,
        status: u16,
        detail: String,
    },

    #[error("Token refresh failed: {0}")]
    AuthRefresh(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Credential file malformed: {0}")]
    CredentialParse(#[from] serde_json::Error),
}

impl PublishError {
    pub fn not_connected(provider: Provider) -> Self {
        Self::NotConnected { provider }
    }

    pub fn provider(provider: Provider, status: u16, detail: impl Into<String>) -> Self {
        Self::Provider {
            provider,
            status,
            detail: detail.into(),
        }
    }

    /// Whether this is a missing-credential failure (the secondary
    /// target treats these as "user never connected", not an error).
    pub fn is_not_connected(&self) -> bool {
        matches!(self, Self::NotConnected { .. })
    }
}
