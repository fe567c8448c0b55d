use crate::cli::OutputFormat;
use crate::error::Result;
use vsub_engine::{Episode, Movie};

/// One line pair per search hit: `[id] title` then the page URL.
pub fn format_search_results(movies: &[Movie], limit: usize) -> String {
    let mut out = String::new();
    for movie in movies.iter().take(limit) {
        out.push_str(&format!("[{}] {}\n    {}\n", movie.id, movie.title, movie.href));
    }
    out
}

pub fn format_movie(movie: &Movie, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(movie.to_string()),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(movie)?),
    }
}

pub fn format_episodes(episodes: &[Episode], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(episodes
            .iter()
            .enumerate()
            .map(|(i, episode)| format!("[{}] {}\n", i + 1, episode.title))
            .collect()),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(episodes)?),
    }
}

/// File name for an episode title, safe on every platform.
pub fn sanitize_filename(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = cleaned.trim().trim_matches('.');
    if trimmed.is_empty() {
        "episode".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episode(title: &str) -> Episode {
        Episode {
            movie_id: 1,
            title: title.to_string(),
            href: String::new(),
            hash: "h".to_string(),
        }
    }

    #[test]
    fn test_search_results_respect_limit() {
        let movies: Vec<Movie> = (1..=3)
            .map(|id| Movie {
                id,
                title: format!("Movie {id}"),
                href: format!("https://x/a{id}/"),
                ..Default::default()
            })
            .collect();

        assert_eq!(
            format_search_results(&movies, 2),
            "[1] Movie 1\n    https://x/a1/\n[2] Movie 2\n    https://x/a2/\n"
        );
        assert_eq!(format_search_results(&movies, 0), "");
    }

    #[test]
    fn test_episodes_text_and_json() {
        let episodes = vec![episode("Tập 01"), episode("Tập 02")];
        assert_eq!(
            format_episodes(&episodes, OutputFormat::Text).unwrap(),
            "[1] Tập 01\n[2] Tập 02\n"
        );

        let json = format_episodes(&episodes, OutputFormat::Json).unwrap();
        let parsed: Vec<Episode> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, episodes);
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Tập 01"), "Tập 01");
        assert_eq!(sanitize_filename("a/b\\c:d?"), "a_b_c_d_");
        assert_eq!(sanitize_filename("  ..  "), "episode");
        assert_eq!(sanitize_filename(""), "episode");
    }
}
