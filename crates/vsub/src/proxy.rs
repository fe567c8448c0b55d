use std::fmt::Write;

use bytes::Bytes;
use reqwest::Client;
use tracing::debug;

use crate::catalog::Catalog;
use crate::config::SiteConfig;
use crate::error::Result;
use crate::fetcher::SegmentFetcher;
use crate::models::{Episode, EpisodeHandle, Movie};
use crate::playlist::decode_token;
use crate::resolver::PlaylistResolver;

/// Everything the proxy server needs, captured once at construction.
///
/// Holds no mutable state, so one instance serves any number of concurrent
/// requests.
#[derive(Debug, Clone)]
pub struct ManifestProxy {
    resolver: PlaylistResolver,
    fetcher: SegmentFetcher,
    catalog: Catalog,
    prefix: String,
}

impl ManifestProxy {
    pub fn new(client: Client, config: &SiteConfig) -> Self {
        Self {
            resolver: PlaylistResolver::new(client.clone(), config),
            fetcher: SegmentFetcher::new(client.clone(), config),
            catalog: Catalog::new(client, config.clone()),
            prefix: config.proxy_prefix.clone(),
        }
    }

    /// First path component of segment routes.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Resolves `handle` and routes every segment through this proxy.
    pub async fn rewritten_manifest(&self, handle: &EpisodeHandle) -> Result<String> {
        let playlist = self.resolver.resolve(handle).await?;
        Ok(playlist.rewritten(&self.prefix))
    }

    /// Fetches and unwraps the segment named by `token`.
    ///
    /// The token is validated before any upstream request is made.
    pub async fn segment(&self, token: &str) -> Result<Bytes> {
        let url = decode_token(token)?;
        debug!(url = %url, "proxying segment");
        self.fetcher.fetch_payload(&url).await
    }

    /// Playlist of playlists, one entry per episode of the movie.
    pub async fn episode_index(&self, movie_id: u64) -> Result<String> {
        let movie = self.catalog.details(movie_id).await?;
        Ok(episode_index(&movie.episodes))
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Movie>> {
        self.catalog.search(query).await
    }
}

/// Entries are relative so they resolve under `/movies/{id}/`.
pub fn episode_index(episodes: &[Episode]) -> String {
    let mut out = String::from("#EXTM3U\n");
    for episode in episodes {
        let _ = writeln!(out, "#EXTINF:-1,{}", episode.title);
        let _ = writeln!(out, "{}/index.m3u8", episode.hash);
    }
    out
}
