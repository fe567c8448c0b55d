use reqwest::Client;
use reqwest::header::USER_AGENT;
use tracing::{debug, info};

use crate::cipher::ManifestCipher;
use crate::config::SiteConfig;
use crate::error::{Result, VsubError};
use crate::models::{EncryptedManifest, EpisodeHandle};
use crate::playlist::ResolvedPlaylist;

/// Path of the manifest API, relative to the site origin.
pub const PLAYER_API: &str = "ajax/player";

/// Turns an [`EpisodeHandle`] into a decoded playlist.
#[derive(Debug, Clone)]
pub struct PlaylistResolver {
    client: Client,
    endpoint: String,
    user_agent: String,
    cipher: ManifestCipher,
}

impl PlaylistResolver {
    pub fn new(client: Client, config: &SiteConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint(PLAYER_API),
            user_agent: config.user_agent.clone(),
            cipher: ManifestCipher::new(&config.secret),
        }
    }

    pub async fn resolve(&self, handle: &EpisodeHandle) -> Result<ResolvedPlaylist> {
        debug!(
            movie_id = handle.movie_id,
            endpoint = %self.endpoint,
            "requesting manifest"
        );

        let movie_id = handle.movie_id.to_string();
        let response = self
            .client
            .post(&self.endpoint)
            .header(USER_AGENT, &self.user_agent)
            .form(&[
                ("link", handle.link_token.as_str()),
                ("id", movie_id.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(VsubError::Status {
                status,
                url: self.endpoint.clone(),
            });
        }

        let body = response.bytes().await?;
        let manifest: EncryptedManifest = serde_json::from_slice(&body)?;
        let playlist = self.decode_manifest(manifest)?;

        info!(
            movie_id = handle.movie_id,
            title = %playlist.title,
            segments = playlist.segments.len(),
            "resolved playlist"
        );
        Ok(playlist)
    }

    /// Decodes the first link of an already fetched manifest.
    pub fn decode_manifest(&self, manifest: EncryptedManifest) -> Result<ResolvedPlaylist> {
        let link = manifest
            .link
            .into_iter()
            .next()
            .ok_or(VsubError::EmptyManifest)?;
        let text = self.cipher.decode(&link.file)?;
        ResolvedPlaylist::parse(manifest.title, text)
    }
}
