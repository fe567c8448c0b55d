use crate::{
    cli::OutputFormat,
    config::AppConfig,
    error::{CliError, Result},
    output::{format_episodes, format_movie, format_search_results, sanitize_filename},
    progress::EpisodeProgress,
    range::EpisodeRange,
};
use reqwest::Client;
use std::net::SocketAddr;
use std::path::Path;
use tokio::io::BufWriter;
use tracing::{error, info};
use vsub_engine::{
    AdaptiveDownloader, Catalog, Episode, ManifestProxy, PlaylistResolver, SegmentFetcher,
    SiteConfig, create_client, server,
};

pub struct CommandExecutor {
    config: AppConfig,
    site: SiteConfig,
    client: Client,
    catalog: Catalog,
    quiet: bool,
}

impl CommandExecutor {
    pub fn new(config: AppConfig, quiet: bool) -> Result<Self> {
        let site = config.site_config();
        let client = create_client(&site)?;
        let catalog = Catalog::new(client.clone(), site.clone());
        Ok(Self {
            config,
            site,
            client,
            catalog,
            quiet,
        })
    }

    pub async fn search(&self, query: &str, limit: usize) -> Result<()> {
        let movies = self.catalog.search(query).await?;
        info!(query, results = movies.len(), "search finished");
        print!("{}", format_search_results(&movies, limit));
        Ok(())
    }

    pub async fn details(&self, id: u64, format: OutputFormat) -> Result<()> {
        let movie = self.catalog.details(id).await?;
        println!("{}", format_movie(&movie, format)?.trim_end());
        Ok(())
    }

    pub async fn episodes(&self, id: u64, format: OutputFormat) -> Result<()> {
        let movie = self.catalog.details(id).await?;
        println!("{}", format_episodes(&movie.episodes, format)?.trim_end());
        Ok(())
    }

    /// Downloads every episode of `episode_range`; a failed episode does not
    /// stop the ones after it.
    pub async fn download(&self, id: u64, episode_range: &str, output: &Path) -> Result<()> {
        let range = EpisodeRange::parse(episode_range)?;
        if !output.is_dir() {
            return Err(CliError::invalid_input(format!(
                "directory '{}' does not exist",
                output.display()
            )));
        }

        let movie = self.catalog.details(id).await?;
        let selected = &movie.episodes[range.indices(movie.episodes.len())?];

        let resolver = PlaylistResolver::new(self.client.clone(), &self.site);
        let downloader = AdaptiveDownloader::new(
            SegmentFetcher::new(self.client.clone(), &self.site),
            self.config.pacing_config(),
        );

        let mut failed = 0;
        for episode in selected {
            let path = output.join(format!("{}.ts", sanitize_filename(&episode.title)));
            let progress = EpisodeProgress::new(format!("{}", path.display()), self.quiet);

            match self
                .download_episode(&resolver, &downloader, episode, &path, &progress)
                .await
            {
                Ok(bytes) => {
                    progress.finish(format!("{} downloaded", path.display()));
                    info!(path = %path.display(), bytes, "episode downloaded");
                }
                Err(e) => {
                    failed += 1;
                    progress.abandon(format!("{} failed", path.display()));
                    error!(path = %path.display(), error = %e, "episode download failed");
                    eprintln!("{} download error: {}", path.display(), e);
                }
            }
        }

        if failed > 0 {
            return Err(CliError::EpisodesFailed {
                failed,
                total: selected.len(),
            });
        }
        Ok(())
    }

    async fn download_episode(
        &self,
        resolver: &PlaylistResolver,
        downloader: &AdaptiveDownloader,
        episode: &Episode,
        path: &Path,
        progress: &EpisodeProgress,
    ) -> Result<u64> {
        let playlist = resolver.resolve(&episode.handle()).await?;
        let file = tokio::fs::File::create(path).await?;
        let mut writer = BufWriter::new(file);

        let report = downloader
            .download_with_progress(&playlist.segments, &mut writer, |fraction| {
                progress.set_fraction(fraction)
            })
            .await?;
        Ok(report.bytes_written)
    }

    /// Writes the decoded, unmodified playlist of a single episode.
    pub async fn playlist(&self, id: u64, episode: &str, output: &Path) -> Result<()> {
        let range = EpisodeRange::parse(episode)?;
        if range.count() != 1 {
            return Err(CliError::invalid_input(format!(
                "expected a single episode number, got '{episode}'"
            )));
        }

        let movie = self.catalog.details(id).await?;
        let index = *range.indices(movie.episodes.len())?.start();
        let resolver = PlaylistResolver::new(self.client.clone(), &self.site);
        let playlist = resolver.resolve(&movie.episodes[index].handle()).await?;

        tokio::fs::write(output, playlist.text.as_bytes()).await?;
        info!(path = %output.display(), segments = playlist.segments.len(), "playlist saved");
        Ok(())
    }

    pub async fn serve(&self, bind: Option<SocketAddr>) -> Result<()> {
        let addr = bind.unwrap_or(self.config.server.bind);
        let proxy = ManifestProxy::new(self.client.clone(), &self.site);
        if !self.quiet {
            println!("Serving HLS proxy on http://{addr}");
            println!("Playlist: http://{addr}/movies/<id>/index.m3u8");
        }
        server::serve(proxy, addr).await?;
        Ok(())
    }
}
