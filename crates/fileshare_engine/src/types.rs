use std::fmt;
use std::path::PathBuf;

use bytes::Bytes;
use thiserror::Error;

/// One file handed to the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub source: FileSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    Memory(Bytes),
    Path(PathBuf),
}

impl UploadFile {
    pub fn from_bytes(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            source: FileSource::Memory(data.into()),
        }
    }

    /// Uses the path's final component as the display name.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self {
            name,
            source: FileSource::Path(path),
        }
    }
}

/// Terminal result of one transport call. Success is `Completed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Completed,
    Failed(FailureKind),
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UploadOutcome::Completed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    HttpStatus(u16),
    Rejected(String),
    Network,
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Timeout => write!(f, "deadline exceeded"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Rejected(message) => write!(f, "rejected by server: {message}"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Io => write!(f, "could not read local file"),
        }
    }
}

/// Errors from the list/download/delete/archive requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("server rejected request: {0}")]
    Rejected(String),
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("could not save download: {0}")]
    LocalIo(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return ApiError::Timeout(err.to_string());
        }
        if err.is_decode() {
            return ApiError::Decode(err.to_string());
        }
        if let Some(status) = err.status() {
            return ApiError::HttpStatus(status.as_u16());
        }
        ApiError::Network(err.to_string())
    }
}

impl From<&ApiError> for FailureKind {
    fn from(err: &ApiError) -> Self {
        match err {
            ApiError::Timeout(_) => FailureKind::Timeout,
            ApiError::HttpStatus(code) => FailureKind::HttpStatus(*code),
            ApiError::Rejected(message) => FailureKind::Rejected(message.clone()),
            ApiError::LocalIo(_) => FailureKind::Io,
            ApiError::InvalidUrl(_) | ApiError::Decode(_) | ApiError::Network(_) => {
                FailureKind::Network
            }
        }
    }
}
