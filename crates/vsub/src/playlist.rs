//! Decoded HLS playlists: segment listing, proxy tokens and rewriting.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use url::Url;

use crate::error::{Result, VsubError};

/// Suffix appended to proxy tokens so players treat the path as a TS segment.
pub const SEGMENT_SUFFIX: &str = ".ts";

/// A playlist after the manifest cipher has been undone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPlaylist {
    pub title: String,
    /// Playlist text exactly as decoded
    pub text: String,
    /// Segment URLs in playlist order
    pub segments: Vec<String>,
}

impl ResolvedPlaylist {
    /// Fails with [`VsubError::EmptyPlaylist`] when `text` lists no segments.
    pub fn parse(title: impl Into<String>, text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        let segments = segment_urls(&text);
        if segments.is_empty() {
            return Err(VsubError::EmptyPlaylist);
        }
        Ok(Self {
            title: title.into(),
            text,
            segments,
        })
    }

    /// Playlist text with every segment routed through the proxy under `prefix`.
    pub fn rewritten(&self, prefix: &str) -> String {
        rewrite_playlist(&self.text, prefix)
    }
}

/// A line is a segment reference iff it starts with `http`.
pub fn is_segment_line(line: &str) -> bool {
    line.starts_with("http")
}

/// Every segment URL of `text`, in order, stripped of a trailing `\r`.
pub fn segment_urls(text: &str) -> Vec<String> {
    text.split('\n')
        .filter(|line| is_segment_line(line))
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect()
}

/// Replaces each segment line of `text` with its proxy path.
///
/// Non-segment lines, line order and line endings are preserved.
pub fn rewrite_playlist(text: &str, prefix: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if is_segment_line(line) {
            let url = line.trim_end_matches('\r');
            out.push_str(&segment_path(prefix, url));
            out.push_str(&line[url.len()..]);
        } else {
            out.push_str(line);
        }
    }
    out
}

/// Path under which the proxy serves `url`.
pub fn segment_path(prefix: &str, url: &str) -> String {
    format!("/{}/{}{}", prefix, encode_token(url), SEGMENT_SUFFIX)
}

/// URL-safe, unpadded base64 of the segment URL.
pub fn encode_token(url: &str) -> String {
    URL_SAFE_NO_PAD.encode(url.as_bytes())
}

/// Inverse of [`encode_token`].
///
/// Padded tokens are accepted. The decoded value must be an absolute
/// `http`/`https` URL; it is returned byte-for-byte as encoded.
pub fn decode_token(token: &str) -> Result<String> {
    let bytes = URL_SAFE_NO_PAD
        .decode(token.trim_end_matches('='))
        .map_err(|e| VsubError::BadToken(format!("not url-safe base64: {e}")))?;
    let decoded = String::from_utf8(bytes)
        .map_err(|_| VsubError::BadToken("decoded token is not utf-8".to_string()))?;
    if decoded.is_empty() {
        return Err(VsubError::BadToken("empty token".to_string()));
    }

    let url = Url::parse(&decoded)
        .map_err(|e| VsubError::BadToken(format!("decoded token is not a url: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(VsubError::BadToken(format!(
            "unsupported scheme: {}",
            url.scheme()
        )));
    }
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAYLIST: &str = "#EXTM3U\n#EXTINF:10.0,\nhttps://cdn.example/seg-0.png\n#EXTINF:10.0,\nhttps://cdn.example/seg-1.png?sig=a+b/c\nhttps://cdn.example/seg-2.png\n#EXT-X-ENDLIST";

    #[test]
    fn test_segment_urls_in_order() {
        assert_eq!(
            segment_urls(PLAYLIST),
            vec![
                "https://cdn.example/seg-0.png",
                "https://cdn.example/seg-1.png?sig=a+b/c",
                "https://cdn.example/seg-2.png",
            ]
        );
    }

    #[test]
    fn test_segment_urls_crlf() {
        let text = "#EXTM3U\r\nhttp://a/1\r\n#EXTINF:1,\r\nhttp://a/2\r\n";
        assert_eq!(segment_urls(text), vec!["http://a/1", "http://a/2"]);
    }

    #[test]
    fn test_parse_rejects_playlist_without_segments() {
        let result = ResolvedPlaylist::parse("t", "#EXTM3U\n#EXT-X-ENDLIST\n");
        assert!(matches!(result, Err(VsubError::EmptyPlaylist)));
    }

    #[test]
    fn test_rewrite_keeps_metadata_and_order() {
        let rewritten = rewrite_playlist(PLAYLIST, "chunks");
        let original: Vec<&str> = PLAYLIST.split('\n').collect();
        let lines: Vec<&str> = rewritten.split('\n').collect();
        assert_eq!(lines.len(), original.len());

        let mut decoded = Vec::new();
        for (before, after) in original.iter().zip(&lines) {
            if is_segment_line(before) {
                let token = after
                    .strip_prefix("/chunks/")
                    .and_then(|rest| rest.strip_suffix(SEGMENT_SUFFIX))
                    .unwrap();
                decoded.push(decode_token(token).unwrap());
            } else {
                assert_eq!(before, after);
            }
        }
        assert_eq!(decoded, segment_urls(PLAYLIST));
    }

    #[test]
    fn test_rewrite_preserves_crlf() {
        let rewritten = rewrite_playlist("#EXTM3U\r\nhttp://a/1\r\n", "p");
        assert_eq!(
            rewritten,
            format!("#EXTM3U\r\n/p/{}.ts\r\n", encode_token("http://a/1"))
        );
    }

    #[test]
    fn test_token_is_path_safe() {
        let url = "https://cdn.example/seg.png?sig=+/+/~~~&x=?";
        let token = encode_token(url);
        assert!(!token.contains(['/', '+', '=']));
        assert_eq!(decode_token(&token).unwrap(), url);
    }

    #[test]
    fn test_token_accepts_padding() {
        let url = "http://a/b";
        let padded = base64::engine::general_purpose::URL_SAFE.encode(url);
        assert!(padded.ends_with('='));
        assert_eq!(decode_token(&padded).unwrap(), url);
    }

    #[test]
    fn test_bad_tokens() {
        let tokens = vec![
            String::new(),
            "!!!".to_string(),
            URL_SAFE_NO_PAD.encode("ftp://a/b"),
            URL_SAFE_NO_PAD.encode("not a url"),
            URL_SAFE_NO_PAD.encode([0xff, 0xfe]),
        ];
        for token in &tokens {
            let err = decode_token(token).unwrap_err();
            assert!(err.is_client_error(), "token {token:?} gave {err}");
        }
    }
}
