//! Pinning service client (Pinata v3).
//!
//! Creates a named public group per collection and uploads files into it.
//! No relation is enforced between a group and any on-chain collection;
//! they are correlated only by the human-chosen name.

use crate::config::Config;
use crate::Error;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::info;

/// A named asset group in the pinning service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinGroup {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// One pinned file inside a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinnedFile {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub cid: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub group_id: Option<String>,
}

/// A file taken off the upload request, ready to pin.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

/// Client for the pinning service's group and upload APIs.
pub struct PinataClient {
    http: reqwest::Client,
    api_url: String,
    upload_url: String,
    jwt: String,
}

impl PinataClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: config.pinata_api_url.clone(),
            upload_url: config.pinata_upload_url.clone(),
            jwt: config.pinata_jwt.clone(),
        }
    }

    /// Whether a JWT is configured. Uploads are disabled without one.
    pub fn is_configured(&self) -> bool {
        !self.jwt.is_empty()
    }

    /// Create a named public group.
    pub async fn create_group(&self, name: &str) -> Result<PinGroup, Error> {
        let response = self
            .http
            .post(format!("{}/groups/public", self.api_url))
            .bearer_auth(&self.jwt)
            .json(&serde_json::json!({ "name": name }))
            .send()
            .await
            .map_err(|e| Error::Pinning(format!("create group request failed: {e}")))?;
        let group: PinGroup = Self::parse(response, "create group").await?;
        info!(group_id = %group.id, name = %group.name, "pin group created");
        Ok(group)
    }

    /// Upload one file into a group.
    pub async fn upload_file(&self, group_id: &str, file: UploadFile) -> Result<PinnedFile, Error> {
        let mut part = Part::bytes(file.bytes).file_name(file.name.clone());
        if let Some(content_type) = &file.content_type {
            part = part
                .mime_str(content_type)
                .map_err(|e| Error::Pinning(format!("invalid content type: {e}")))?;
        }
        let form = Form::new()
            .part("file", part)
            .text("name", file.name)
            .text("group_id", group_id.to_string());

        let response = self
            .http
            .post(format!("{}/files", self.upload_url))
            .bearer_auth(&self.jwt)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Pinning(format!("upload request failed: {e}")))?;
        Self::parse(response, "upload file").await
    }

    async fn parse<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        action: &str,
    ) -> Result<T, Error> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Pinning(format!("{action} returned {status}: {body}")));
        }
        let envelope: DataEnvelope<T> = response
            .json()
            .await
            .map_err(|e| Error::Pinning(format!("{action} returned invalid json: {e}")))?;
        Ok(envelope.data)
    }
}
