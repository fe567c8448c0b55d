use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifiers needed to request the manifest of one episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeHandle {
    pub movie_id: u64,
    /// Opaque token issued by the episode list markup
    pub link_token: String,
}

impl EpisodeHandle {
    pub fn new(movie_id: u64, link_token: impl Into<String>) -> Self {
        Self {
            movie_id,
            link_token: link_token.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub movie_id: u64,
    pub title: String,
    pub href: String,
    pub hash: String,
}

impl Episode {
    pub fn handle(&self) -> EpisodeHandle {
        EpisodeHandle::new(self.movie_id, self.hash.clone())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: u64,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub rating: f64,
    pub href: String,
    pub total_episodes: String,
    pub episodes: Vec<Episode>,
}

impl fmt::Display for Movie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Id: {}", self.id)?;
        writeln!(f, "Href: {}", self.href)?;
        writeln!(f, "Title: {}", self.title)?;
        writeln!(f, "Subtitle: {}", self.subtitle)?;
        writeln!(f, "Description: {}", self.description)?;
        writeln!(f, "Rating: {:.1}", self.rating)?;
        writeln!(f, "Episodes: {}", self.total_episodes)
    }
}

/// Body of the player API response.
#[derive(Debug, Deserialize)]
pub struct EncryptedManifest {
    #[serde(default)]
    pub success: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: Vec<ManifestLink>,
}

#[derive(Debug, Deserialize)]
pub struct ManifestLink {
    pub file: String,
}
