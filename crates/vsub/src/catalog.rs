//! Search, movie pages and episode lists scraped from the site markup.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Client;
use reqwest::header::USER_AGENT;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use crate::config::SiteConfig;
use crate::error::{Result, VsubError};
use crate::models::{Episode, Movie};

pub const SEARCH_API: &str = "ajax/suggest";

static DIGITS_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

static SEARCH_ITEM: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("li:not(.ss-bottom)").unwrap());
static SEARCH_TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".ss-title").unwrap());
static EPISODE_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".list-episode li.episode a.btn-episode").unwrap());
static OG_TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[property="og:title"]"#).unwrap());
static OG_DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[property="og:description"]"#).unwrap());
static OG_URL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[property="og:url"]"#).unwrap());
static SCORE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".score div").unwrap());
static TOTAL_EPISODES: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".duration div").unwrap());

#[derive(Debug, Clone)]
pub struct Catalog {
    client: Client,
    config: SiteConfig,
}

impl Catalog {
    pub fn new(client: Client, config: SiteConfig) -> Self {
        Self { client, config }
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Movie>> {
        let url = self.config.endpoint(SEARCH_API);
        debug!(query, url = %url, "searching");

        let response = self
            .client
            .post(&url)
            .header(USER_AGENT, &self.config.user_agent)
            .form(&[("ajaxSearch", "1"), ("keysearch", query)])
            .send()
            .await?;
        let body = self.text(response, &url).await?;
        Ok(parse_search_results(&body))
    }

    /// Episode list of the movie whose page lives at `movie_href`.
    pub async fn episodes(&self, movie_href: &str, movie_id: u64) -> Result<Vec<Episode>> {
        let url = format!(
            "{}/xem-phim.html",
            self.absolute_url(movie_href)?.trim_end_matches('/')
        );
        debug!(movie_id, url = %url, "loading episodes");

        let body = self.get(&url).await?;
        Ok(parse_episodes(movie_id, &body))
    }

    /// Movie metadata plus its episode list.
    pub async fn details(&self, movie_id: u64) -> Result<Movie> {
        let url = self.config.endpoint(&format!("phim/-a{movie_id}/"));
        debug!(movie_id, url = %url, "loading movie page");

        let body = self.get(&url).await?;
        let mut movie = parse_movie_page(movie_id, &body);
        if movie.href.is_empty() {
            movie.href = url;
        }

        movie.episodes = self.episodes(&movie.href, movie_id).await?;
        if movie.total_episodes.is_empty() {
            movie.total_episodes = movie.episodes.len().to_string();
        }
        Ok(movie)
    }

    fn absolute_url(&self, href: &str) -> Result<String> {
        let base = Url::parse(&self.config.domain)
            .map_err(|e| VsubError::InvalidUrl(format!("{}: {e}", self.config.domain)))?;
        base.join(href)
            .map(String::from)
            .map_err(|e| VsubError::InvalidUrl(format!("{href}: {e}")))
    }

    async fn get(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, &self.config.user_agent)
            .send()
            .await?;
        self.text(response, url).await
    }

    async fn text(&self, response: reqwest::Response, url: &str) -> Result<String> {
        let status = response.status();
        if !status.is_success() {
            return Err(VsubError::Status {
                status,
                url: url.to_string(),
            });
        }
        Ok(response.text().await?)
    }
}

/// Largest decimal number embedded in `text`, 0 when there is none.
pub fn largest_number(text: &str) -> u64 {
    DIGITS_REGEX
        .find_iter(text)
        .filter_map(|m| m.as_str().parse::<u64>().ok())
        .max()
        .unwrap_or(0)
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn meta_content(document: &Html, selector: &Selector) -> String {
    document
        .select(selector)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .map(|content| content.trim().to_string())
        .unwrap_or_default()
}

pub fn parse_search_results(html: &str) -> Vec<Movie> {
    let fragment = Html::parse_fragment(html);
    fragment
        .select(&SEARCH_ITEM)
        .map(|item| {
            let link = item.select(&SEARCH_TITLE).next();
            let title = link.map(element_text).unwrap_or_default();
            let href = link
                .and_then(|link| link.value().attr("href"))
                .unwrap_or_default()
                .to_string();
            Movie {
                id: largest_number(&href),
                title,
                href,
                ..Default::default()
            }
        })
        .collect()
}

pub fn parse_episodes(movie_id: u64, html: &str) -> Vec<Episode> {
    let document = Html::parse_document(html);
    document
        .select(&EPISODE_LINK)
        .map(|link| {
            let attr = |name: &str| link.value().attr(name).unwrap_or_default().to_string();
            Episode {
                movie_id,
                title: attr("title"),
                href: attr("href"),
                hash: attr("data-hash"),
            }
        })
        .collect()
}

/// Metadata of a movie page; episodes are left empty.
pub fn parse_movie_page(movie_id: u64, html: &str) -> Movie {
    let document = Html::parse_document(html);
    let title = meta_content(&document, &OG_TITLE);

    // "8.7 || 123 votes"
    let rating = document
        .select(&SCORE)
        .last()
        .map(element_text)
        .and_then(|score| score.split("||").next().map(|s| s.trim().parse::<f64>()))
        .and_then(|parsed| parsed.ok())
        .unwrap_or_default();

    Movie {
        id: movie_id,
        subtitle: title.clone(),
        title,
        description: meta_content(&document, &OG_DESCRIPTION),
        rating,
        href: meta_content(&document, &OG_URL),
        total_episodes: document
            .select(&TOTAL_EPISODES)
            .last()
            .map(element_text)
            .unwrap_or_default(),
        episodes: Vec::new(),
    }
}
