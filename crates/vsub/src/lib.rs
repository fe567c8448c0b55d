//! # vsub-engine
//!
//! Resolves and streams episodes from AnimeVietSub, whose delivery pipeline
//! is deliberately obfuscated.
//!
//! ## Features
//!
//! - Manifest decryption (AES-CBC, raw DEFLATE, quoted literal)
//! - Extraction of media payloads hidden behind PNG images
//! - Sequential downloads with adaptive, rate-limit aware pacing
//! - An HLS proxy that lets ordinary players consume the site
//! - Catalog scraping: search, movie details and episode lists

pub mod catalog;
pub mod cipher;
pub mod client;
pub mod config;
pub mod container;
pub mod downloader;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod pacing;
pub mod playlist;
pub mod proxy;
pub mod resolver;
pub mod server;

pub use catalog::Catalog;
pub use cipher::{CipherError, ManifestCipher};
pub use client::create_client;
pub use config::{PacingConfig, SiteConfig, SiteConfigBuilder};
pub use container::{ContainerError, ContainerStrategy};
pub use downloader::{AdaptiveDownloader, DownloadReport};
pub use error::{Result, VsubError};
pub use fetcher::{FetchOutcome, SegmentFetcher};
pub use models::{Episode, EpisodeHandle, Movie};
pub use pacing::DownloadSession;
pub use playlist::ResolvedPlaylist;
pub use proxy::ManifestProxy;
pub use resolver::PlaylistResolver;
