//! Webhook notification sink.
//!
//! Optional and best-effort: no configured endpoint means a silent
//! no-op, and delivery errors surface only to the caller's log.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::debug;

use crate::services::NotifySink;

/// POSTs `{recipient, subject, body}` to a configured webhook.
pub struct WebhookNotifier {
    http: Client,
    endpoint: Option<String>,
}

impl WebhookNotifier {
    pub fn new(endpoint: Option<String>) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .connect_timeout(Duration::from_secs(5))
            .user_agent(concat!("autopub-worker/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, endpoint })
    }

    /// Endpoint from `NOTIFY_WEBHOOK_URL`; unset disables notification.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::new(std::env::var("NOTIFY_WEBHOOK_URL").ok().filter(|u| !u.is_empty()))
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }
}

#[async_trait]
impl NotifySink for WebhookNotifier {
    async fn notify(&self, recipient: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        let Some(endpoint) = &self.endpoint else {
            debug!("No notification endpoint configured, skipping");
            return Ok(());
        };

        let response = self
            .http
            .post(endpoint)
            .json(&json!({
                "recipient": recipient,
                "subject": subject,
                "body": body,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("notification endpoint returned {}", status);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_notifier_is_a_noop() {
        let notifier = WebhookNotifier::new(None).unwrap();
        assert!(!notifier.is_configured());
        notifier
            .notify("u1@example.com", "subject", "body")
            .await
            .unwrap();
    }

    #[test]
    fn test_from_env_treats_empty_as_unset() {
        // Whatever the ambient env, an empty string must disable
        std::env::set_var("NOTIFY_WEBHOOK_URL", "");
        let notifier = WebhookNotifier::from_env().unwrap();
        assert!(!notifier.is_configured());
        std::env::remove_var("NOTIFY_WEBHOOK_URL");
    }
}
