//! Best-effort secondary upload to Google Drive.
//!
//! Finished videos are organized under an application folder, then one
//! subfolder per user, both created on first use and reused afterwards.

use std::path::Path;
use std::sync::Arc;

use reqwest::multipart;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use autopub_models::UserId;

use crate::credentials::{CredentialStore, Provider};
use crate::error::{PublishError, PublishResult};

const DEFAULT_API_BASE: &str = "https://www.googleapis.com/drive/v3";
const DEFAULT_UPLOAD_BASE: &str = "https://www.googleapis.com/upload/drive/v3";

const FOLDER_MIME: &str = "application/vnd.google-apps.folder";

/// Top-level folder all uploads land under.
const APP_FOLDER: &str = "autopub-videos";

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
    #[serde(rename = "webViewLink")]
    web_view_link: Option<String>,
    #[serde(rename = "webContentLink")]
    web_content_link: Option<String>,
}

/// Escape a folder name for embedding in a Drive query string.
fn escape_query_name(name: &str) -> String {
    name.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Google Drive client for a user's connected account.
pub struct DriveClient {
    http: Client,
    credentials: Arc<CredentialStore>,
    api_base: String,
    upload_base: String,
}

impl DriveClient {
    pub fn new(credentials: Arc<CredentialStore>) -> PublishResult<Self> {
        let http = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .user_agent(concat!("autopub-publish/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            credentials,
            api_base: DEFAULT_API_BASE.to_string(),
            upload_base: DEFAULT_UPLOAD_BASE.to_string(),
        })
    }

    /// Point the client at different API hosts (tests).
    pub fn with_bases(mut self, api_base: impl Into<String>, upload_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self.upload_base = upload_base.into();
        self
    }

    /// Upload a local file into the user's folder; returns a shareable
    /// link (or the file id when the provider returns no link).
    pub async fn upload(&self, user: &UserId, local_path: &Path) -> PublishResult<String> {
        let token = self.credentials.access_token(user, Provider::Drive).await?;

        let root = self.ensure_folder(&token, APP_FOLDER, None).await?;
        let user_folder_name = user.as_str().replace('/', "_");
        let user_folder = self
            .ensure_folder(&token, &user_folder_name, Some(&root))
            .await?;

        let file_name = local_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("video.mp4")
            .to_string();
        let metadata = json!({
            "name": file_name,
            "parents": [user_folder],
        });

        let bytes = tokio::fs::read(local_path).await?;
        let form = multipart::Form::new()
            .part(
                "metadata",
                multipart::Part::text(metadata.to_string())
                    .mime_str("application/json; charset=UTF-8")?,
            )
            .part(
                "media",
                multipart::Part::bytes(bytes)
                    .file_name(file_name)
                    .mime_str("video/mp4")?,
            );

        let url = format!(
            "{}/files?uploadType=multipart&fields=id,webViewLink,webContentLink",
            self.upload_base
        );
        let response = self
            .http
            .post(url)
            .bearer_auth(&token)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PublishError::provider(
                Provider::Drive,
                status.as_u16(),
                detail,
            ));
        }

        let file: DriveFile = response.json().await?;
        let link = file
            .web_view_link
            .or(file.web_content_link)
            .unwrap_or(file.id);
        info!(user = %user, link, "Drive upload complete");
        Ok(link)
    }

    /// Find a folder by name (and optional parent), creating it on
    /// first use.
    async fn ensure_folder(
        &self,
        token: &str,
        name: &str,
        parent: Option<&str>,
    ) -> PublishResult<String> {
        let mut query = format!(
            "mimeType='{}' and name='{}' and trashed=false",
            FOLDER_MIME,
            escape_query_name(name)
        );
        if let Some(parent) = parent {
            query.push_str(&format!(" and '{}' in parents", parent));
        }

        let response = self
            .http
            .get(format!("{}/files", self.api_base))
            .bearer_auth(token)
            .query(&[("q", query.as_str()), ("fields", "files(id,name)")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PublishError::provider(
                Provider::Drive,
                status.as_u16(),
                detail,
            ));
        }

        let list: FileList = response.json().await?;
        if let Some(existing) = list.files.first() {
            debug!(name, id = %existing.id, "Reusing Drive folder");
            return Ok(existing.id.clone());
        }

        let mut body = json!({
            "name": name,
            "mimeType": FOLDER_MIME,
        });
        if let Some(parent) = parent {
            body["parents"] = json!([parent]);
        }

        let response = self
            .http
            .post(format!("{}/files", self.api_base))
            .bearer_auth(token)
            .query(&[("fields", "id")])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PublishError::provider(
                Provider::Drive,
                status.as_u16(),
                detail,
            ));
        }

        let created: DriveFile = response.json().await?;
        debug!(name, id = %created.id, "Created Drive folder");
        Ok(created.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_query_name() {
        assert_eq!(escape_query_name("plain"), "plain");
        assert_eq!(escape_query_name("l'été"), "l\\'été");
        assert_eq!(escape_query_name("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_file_list_parsing() {
        let raw = r#"{"files": [{"id": "abc", "webViewLink": "https://drive/abc"}]}"#;
        let list: FileList = serde_json::from_str(raw).unwrap();
        assert_eq!(list.files.len(), 1);
        assert_eq!(list.files[0].id, "abc");
        assert_eq!(
            list.files[0].web_view_link.as_deref(),
            Some("https://drive/abc")
        );

        let empty: FileList = serde_json::from_str("{}").unwrap();
        assert!(empty.files.is_empty());
    }
}
