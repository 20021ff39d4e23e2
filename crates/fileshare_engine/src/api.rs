use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::header::CONTENT_DISPOSITION;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{ApiError, ClientSettings};

/// JSON envelope shared by every store endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    fn into_result(self) -> Result<Option<T>, ApiError> {
        if self.success {
            Ok(self.data)
        } else {
            Err(ApiError::Rejected(
                self.message.unwrap_or_else(|| "request failed".to_string()),
            ))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub name: String,
    pub size: u64,
    pub modified_time: DateTime<Utc>,
    #[serde(default)]
    pub is_dir: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ArchiveRequest<'a> {
    file_count: usize,
    message: &'a str,
}

#[derive(Debug, Serialize)]
struct DownloadManyRequest<'a> {
    files: &'a [String],
}

/// Client for the REST file store.
#[derive(Debug, Clone)]
pub struct FileStoreClient {
    http: reqwest::Client,
    base_url: Url,
}

impl FileStoreClient {
    pub fn new(settings: &ClientSettings) -> Result<Self, ApiError> {
        // No overall request timeout: uploads are bounded by their own deadline.
        let http = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|err| ApiError::Network(err.to_string()))?;
        Ok(Self::with_client(http, settings.base_url.clone()))
    }

    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Appends `segments` to the base URL, percent-encoding each one so a
    /// file name always stays a single path segment.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub async fn list(&self) -> Result<Vec<FileEntry>, ApiError> {
        let response = self.http.get(self.endpoint(&["files"])?).send().await?;
        let entries: Option<Vec<FileEntry>> = read_envelope(response).await?;
        Ok(entries.unwrap_or_default())
    }

    pub async fn download(&self, name: &str) -> Result<Bytes, ApiError> {
        let response = self
            .http
            .get(self.endpoint(&["download", name])?)
            .send()
            .await?;
        let response = ensure_status(response)?;
        Ok(response.bytes().await?)
    }

    /// Fetches several files as one zip. Returns the server-suggested file
    /// name, if any, with the archive bytes.
    pub async fn download_many(&self, names: &[String]) -> Result<(Option<String>, Bytes), ApiError> {
        let response = self
            .http
            .post(self.endpoint(&["download-multiple"])?)
            .json(&DownloadManyRequest { files: names })
            .send()
            .await?;
        let response = ensure_status(response)?;
        let suggested = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(disposition_filename);
        Ok((suggested, response.bytes().await?))
    }

    pub async fn delete(&self, name: &str) -> Result<(), ApiError> {
        let response = self
            .http
            .delete(self.endpoint(&["delete", name])?)
            .send()
            .await?;
        let _: Option<serde_json::Value> = read_envelope(response).await?;
        Ok(())
    }

    /// Asks the server to pack `file_count` files on its side. Only the
    /// count and note are sent.
    pub async fn archive_request(&self, file_count: usize, note: &str) -> Result<(), ApiError> {
        let response = self
            .http
            .post(self.endpoint(&["upload-zip"])?)
            .json(&ArchiveRequest {
                file_count,
                message: note,
            })
            .send()
            .await?;
        let _: Option<serde_json::Value> = read_envelope(response).await?;
        Ok(())
    }
}

fn ensure_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ApiError::HttpStatus(status.as_u16()))
    }
}

async fn read_envelope<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<Option<T>, ApiError> {
    let response = ensure_status(response)?;
    let envelope: ApiResponse<T> = response.json().await?;
    envelope.into_result()
}

fn disposition_filename(header: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|param| param.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}
