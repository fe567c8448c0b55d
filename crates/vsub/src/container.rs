//! Stripping of the image disguise around media segments.
//!
//! Segments are served as valid PNG files with the MPEG-TS payload appended
//! after the image. Which convention a source uses is configured, never sniffed.

use memchr::memmem;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// `IEND` chunk type followed by its CRC. Always preceded by a zero length field.
pub const PNG_END_MARKER: [u8; 8] = [0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82];

/// Leading bytes skipped by the fixed-offset convention.
pub const DEFAULT_FIXED_OFFSET: usize = 128;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContainerError {
    #[error("image end marker not found in {len}-byte segment")]
    MarkerNotFound { len: usize },
    #[error("segment of {len} bytes is shorter than the {offset}-byte disguise")]
    TooShort { len: usize, offset: usize },
}

/// How the real payload is located inside a disguised segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum ContainerStrategy {
    /// Payload starts right after the first PNG end marker.
    #[default]
    EndMarker,
    /// Payload starts after a constant number of leading bytes.
    FixedOffset { offset: usize },
}

impl ContainerStrategy {
    pub fn fixed_offset() -> Self {
        Self::FixedOffset {
            offset: DEFAULT_FIXED_OFFSET,
        }
    }

    /// Returns the payload slice of `blob`.
    pub fn extract<'a>(&self, blob: &'a [u8]) -> Result<&'a [u8], ContainerError> {
        match *self {
            Self::EndMarker => extract_after_end_marker(blob),
            Self::FixedOffset { offset } => {
                if blob.len() < offset {
                    return Err(ContainerError::TooShort {
                        len: blob.len(),
                        offset,
                    });
                }
                Ok(&blob[offset..])
            }
        }
    }
}

/// Returns everything after the first PNG end marker in `blob`.
pub fn extract_after_end_marker(blob: &[u8]) -> Result<&[u8], ContainerError> {
    memmem::find(blob, &PNG_END_MARKER)
        .map(|pos| &blob[pos + PNG_END_MARKER.len()..])
        .ok_or(ContainerError::MarkerNotFound { len: blob.len() })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disguise(payload: &[u8]) -> Vec<u8> {
        let mut blob = vec![0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];
        // IHDR chunk with a bogus body; only the tail matters.
        blob.extend_from_slice(&[0, 0, 0, 13]);
        blob.extend_from_slice(b"IHDR");
        blob.extend_from_slice(&[0u8; 17]);
        blob.extend_from_slice(&[0, 0, 0, 0]);
        blob.extend_from_slice(&PNG_END_MARKER);
        blob.extend_from_slice(payload);
        blob
    }

    #[test]
    fn test_end_marker_payload_lengths() {
        for len in [0usize, 1, 10_000] {
            let payload: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
            let blob = disguise(&payload);
            let extracted = ContainerStrategy::EndMarker.extract(&blob).unwrap();
            assert_eq!(extracted, payload.as_slice(), "payload length {len}");
        }
    }

    #[test]
    fn test_end_marker_uses_first_occurrence() {
        let mut payload = b"ts-data".to_vec();
        payload.extend_from_slice(&PNG_END_MARKER);
        payload.extend_from_slice(b"more");
        let blob = disguise(&payload);

        assert_eq!(extract_after_end_marker(&blob).unwrap(), payload.as_slice());
    }

    #[test]
    fn test_end_marker_missing() {
        let blob = b"\x89PNG\r\n\x1a\n no end here".to_vec();
        assert_eq!(
            ContainerStrategy::EndMarker.extract(&blob),
            Err(ContainerError::MarkerNotFound { len: blob.len() })
        );
    }

    #[test]
    fn test_partial_marker_is_not_a_match() {
        let blob = [&PNG_END_MARKER[..7], &b"payload"[..]].concat();
        assert!(extract_after_end_marker(&blob).is_err());
    }

    #[test]
    fn test_fixed_offset() {
        let mut blob = vec![0xAA; DEFAULT_FIXED_OFFSET];
        blob.extend_from_slice(b"payload");
        // A marker inside the skipped region is irrelevant in this mode.
        blob[10..18].copy_from_slice(&PNG_END_MARKER);

        let extracted = ContainerStrategy::fixed_offset().extract(&blob).unwrap();
        assert_eq!(extracted, b"payload");
    }

    #[test]
    fn test_fixed_offset_too_short() {
        let blob = vec![0u8; 64];
        assert_eq!(
            ContainerStrategy::fixed_offset().extract(&blob),
            Err(ContainerError::TooShort {
                len: 64,
                offset: DEFAULT_FIXED_OFFSET
            })
        );
    }

    #[test]
    fn test_strategy_from_toml_like_json() {
        let strategy: ContainerStrategy =
            serde_json::from_str(r#"{"mode":"fixed-offset","offset":120}"#).unwrap();
        assert_eq!(strategy, ContainerStrategy::FixedOffset { offset: 120 });

        let strategy: ContainerStrategy = serde_json::from_str(r#"{"mode":"end-marker"}"#).unwrap();
        assert_eq!(strategy, ContainerStrategy::EndMarker);
    }
}
