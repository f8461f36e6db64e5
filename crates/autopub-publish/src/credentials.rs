//! Per-user OAuth credentials with transparent refresh.
//!
//! Tokens live in one JSON file per user and provider under the data
//! directory (`tokens/<user-id>/<provider>.json`), written by the OAuth
//! consent flow (out of scope here) and read/refreshed by the pipeline.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use autopub_models::UserId;

use crate::error::{PublishError, PublishResult};

/// Refresh margin: refresh 60 seconds before expiry.
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// A publish target a user may have connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Youtube,
    Drive,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Youtube => "youtube",
            Provider::Drive => "drive",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// On-disk credential record for one user and provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCredential {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl StoredCredential {
    /// Whether the access token needs refreshing before use.
    pub fn needs_refresh(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                Utc::now() + chrono::Duration::seconds(TOKEN_REFRESH_MARGIN_SECS) >= expires_at
            }
            // Unknown expiry: assume usable, the provider will 401 if not
            None => false,
        }
    }
}

/// Successful token-endpoint response.
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Loads, refreshes and persists per-user provider credentials.
pub struct CredentialStore {
    http: Client,
    tokens_dir: PathBuf,
}

impl CredentialStore {
    pub fn new(tokens_dir: impl Into<PathBuf>) -> PublishResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("autopub-publish/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            tokens_dir: tokens_dir.into(),
        })
    }

    /// Path of the credential file for one user and provider.
    pub fn credential_path(&self, user: &UserId, provider: Provider) -> PathBuf {
        self.tokens_dir
            .join(user.as_str())
            .join(format!("{}.json", provider))
    }

    /// Whether the user has any stored credential for the provider.
    pub async fn is_connected(&self, user: &UserId, provider: Provider) -> bool {
        tokio::fs::try_exists(self.credential_path(user, provider))
            .await
            .unwrap_or(false)
    }

    /// Return a usable bearer token for the user and provider,
    /// refreshing and persisting the credential when needed.
    pub async fn access_token(&self, user: &UserId, provider: Provider) -> PublishResult<String> {
        let path = self.credential_path(user, provider);
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PublishError::not_connected(provider));
            }
            Err(e) => return Err(e.into()),
        };
        let mut credential: StoredCredential = serde_json::from_slice(&raw)?;

        if !credential.needs_refresh() {
            return Ok(credential.access_token);
        }

        let Some(refresh_token) = credential.refresh_token.clone() else {
            // Expired with no way to refresh: same as never connected
            return Err(PublishError::not_connected(provider));
        };

        debug!(user = %user, %provider, "Refreshing access token");
        let refreshed = self
            .refresh(&credential, &refresh_token)
            .await
            .map_err(|e| PublishError::AuthRefresh(e.to_string()))?;

        credential.access_token = refreshed.access_token.clone();
        credential.expires_at = refreshed
            .expires_in
            .map(|secs| Utc::now() + chrono::Duration::seconds(secs));
        self.persist(&path, &credential).await?;

        Ok(credential.access_token)
    }

    async fn refresh(
        &self,
        credential: &StoredCredential,
        refresh_token: &str,
    ) -> PublishResult<RefreshResponse> {
        let response = self
            .http
            .post(&credential.token_uri)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", credential.client_id.as_str()),
                ("client_secret", credential.client_secret.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PublishError::AuthRefresh(format!(
                "token endpoint returned {}: {}",
                status, detail
            )));
        }

        Ok(response.json().await?)
    }

    async fn persist(&self, path: &Path, credential: &StoredCredential) -> PublishResult<()> {
        let raw = serde_json::to_vec_pretty(credential)?;
        tokio::fs::write(path, raw).await?;
        Ok(())
    }
}
