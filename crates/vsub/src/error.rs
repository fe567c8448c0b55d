use reqwest::StatusCode;
use thiserror::Error;

use crate::cipher::CipherError;
use crate::container::ContainerError;

#[derive(Error, Debug)]
pub enum VsubError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("upstream returned {status} for {url}")]
    Status { status: StatusCode, url: String },
    #[error("{0}")]
    Cipher(#[from] CipherError),
    #[error("{0}")]
    Container(#[from] ContainerError),
    #[error("manifest response carries no link")]
    EmptyManifest,
    #[error("decoded playlist contains no segment URLs")]
    EmptyPlaylist,
    #[error("max retries ({attempts}) exceeded for segment {url}")]
    MaxRetriesExceeded { url: String, attempts: u32 },
    #[error("bad segment token: {0}")]
    BadToken(String),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl VsubError {
    /// Whether the caller, not the upstream, is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::BadToken(_) | Self::InvalidUrl(_))
    }

    /// Whether the upstream answered with its rate-limit signal.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Status { status, .. } if *status == StatusCode::TOO_MANY_REQUESTS)
    }
}

pub type Result<T> = std::result::Result<T, VsubError>;
