//! Single-shot segment fetches with the headers the upstream insists on.

use bytes::Bytes;
use reqwest::header::{REFERER, USER_AGENT};
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::config::SiteConfig;
use crate::container::ContainerStrategy;
use crate::error::{Result, VsubError};

/// Result of one GET against a segment URL.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Disguised container as served by the upstream
    Blob(Bytes),
    /// The upstream answered 429
    RateLimited,
}

/// Stateless fetch + extract capability, cheap to clone and safe to share
/// across concurrent requests.
#[derive(Debug, Clone)]
pub struct SegmentFetcher {
    client: Client,
    referer: String,
    user_agent: String,
    container: ContainerStrategy,
}

impl SegmentFetcher {
    pub fn new(client: Client, config: &SiteConfig) -> Self {
        Self {
            client,
            referer: config.referer().to_string(),
            user_agent: config.user_agent.clone(),
            container: config.container,
        }
    }

    /// Issues one GET. Only 200 and 429 are non-fatal.
    pub async fn fetch(&self, url: &str) -> Result<FetchOutcome> {
        debug!(url, "fetching segment");
        let response = self
            .client
            .get(url)
            .header(REFERER, &self.referer)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(FetchOutcome::Blob(response.bytes().await?)),
            StatusCode::TOO_MANY_REQUESTS => Ok(FetchOutcome::RateLimited),
            status => Err(VsubError::Status {
                status,
                url: url.to_string(),
            }),
        }
    }

    /// Strips the disguise from `blob` without copying the payload.
    pub fn extract(&self, blob: &Bytes) -> Result<Bytes> {
        let payload = self.container.extract(blob)?;
        let start = blob.len() - payload.len();
        Ok(blob.slice(start..))
    }

    /// One fetch + extract cycle with no retry; a 429 is reported as a
    /// status error so the caller's player can apply its own pacing.
    pub async fn fetch_payload(&self, url: &str) -> Result<Bytes> {
        match self.fetch(url).await? {
            FetchOutcome::Blob(blob) => self.extract(&blob),
            FetchOutcome::RateLimited => Err(VsubError::Status {
                status: StatusCode::TOO_MANY_REQUESTS,
                url: url.to_string(),
            }),
        }
    }
}
