//! HTTP client for communicating with dinecal-server

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use dinecal_core::{EventId, EventRecord};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Failures talking to the API
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Could not reach server: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server rejected request ({status}){}", .detail.as_ref().map(|d| format!(": {}", d)).unwrap_or_default())]
    Rejected { status: u16, detail: Option<String> },

    #[error("Could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Event id '{0}' cannot be addressed in a URL")]
    UnaddressableId(EventId),
}

impl ApiError {
    /// Message for the notification slot: the server's `detail` verbatim
    /// when it sent one, the local error for unreadable files, otherwise
    /// `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Rejected {
                detail: Some(detail),
                ..
            } => detail.clone(),
            ApiError::Io { .. } | ApiError::UnaddressableId(_) => self.to_string(),
            _ => fallback.to_string(),
        }
    }
}

/// The operations the view model needs from the API.
pub trait EventsApi {
    /// GET /events
    async fn list_events(&self) -> Result<Vec<EventRecord>, ApiError>;

    /// POST /events
    async fn create_event(&self, record: &EventRecord) -> Result<EventRecord, ApiError>;

    /// DELETE /events/:id
    async fn delete_event(&self, id: &EventId) -> Result<(), ApiError>;

    /// POST /upload-image, returning the stored image reference.
    async fn upload_image(&self, path: &Path) -> Result<String, ApiError>;
}

/// HTTP client for dinecal-server
pub struct Client {
    http: reqwest::Client,
    base: Url,
    base_url: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct UploadResponse {
    path: String,
}

impl Client {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let parsed =
            Url::parse(base_url).with_context(|| format!("Invalid server URL: {}", base_url))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!("Server URL must be http or https: {}", base_url);
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Client {
            http,
            base: parsed,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Where the server serves an uploaded image.
    pub fn image_url(&self, image_path: &str) -> String {
        format!("{}/{}", self.base_url, image_path.trim_start_matches('/'))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `/events/{id}` with the id as one percent-encoded path segment.
    /// Ids that would collapse into another path (empty, `.`, `..`) are
    /// refused.
    fn event_url(&self, id: &EventId) -> Result<Url, ApiError> {
        let segment = id.to_string();
        if matches!(segment.as_str(), "" | "." | "..") {
            return Err(ApiError::UnaddressableId(id.clone()));
        }

        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::UnaddressableId(id.clone()))?
            .pop_if_empty()
            .push("events")
            .push(&segment);
        Ok(url)
    }
}

impl EventsApi for Client {
    async fn list_events(&self) -> Result<Vec<EventRecord>, ApiError> {
        let resp = self.http.get(self.url("/events")).send().await?;
        Ok(check(resp).await?.json().await?)
    }

    async fn create_event(&self, record: &EventRecord) -> Result<EventRecord, ApiError> {
        let resp = self
            .http
            .post(self.url("/events"))
            .json(record)
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    async fn delete_event(&self, id: &EventId) -> Result<(), ApiError> {
        let resp = self
            .http
            .delete(self.event_url(id)?)
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }

    async fn upload_image(&self, path: &Path) -> Result<String, ApiError> {
        let data = tokio::fs::read(path).await.map_err(|source| ApiError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        let part = Part::bytes(data)
            .file_name(file_name)
            .mime_str(mime_for(path))?;
        let form = Form::new().part("file", part);

        let resp = self
            .http
            .post(self.url("/upload-image"))
            .multipart(form)
            .send()
            .await?;
        let upload: UploadResponse = check(resp).await?.json().await?;

        Ok(upload.path)
    }
}

/// Pass successful responses through; turn the rest into `Rejected`.
async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();

    Err(ApiError::Rejected {
        status: status.as_u16(),
        detail: extract_detail(&body),
    })
}

/// Pull `detail` out of an error body. Strings are used verbatim; anything
/// structured (e.g. a list of field errors) is kept as compact JSON.
fn extract_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}
