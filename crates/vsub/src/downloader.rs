//! Sequential, rate-limit aware segment download into a single sink.
//!
//! Segments are fetched strictly one after another and appended to the sink
//! in playlist order. Between segments the downloader pauses for the current
//! [`DownloadSession`] delay; a 429 from the upstream grows that delay and
//! retries the same segment, while streaks of successes shrink it again.

use std::time::Duration;

use bytes::Bytes;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::config::PacingConfig;
use crate::error::{Result, VsubError};
use crate::fetcher::{FetchOutcome, SegmentFetcher};
use crate::pacing::DownloadSession;

/// Summary of a finished download.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadReport {
    pub segments: usize,
    pub bytes_written: u64,
    /// 429 responses absorbed by backoff
    pub rate_limited: u32,
    /// Pacing delay when the download finished
    pub final_delay: Duration,
}

#[derive(Debug, Clone)]
pub struct AdaptiveDownloader {
    fetcher: SegmentFetcher,
    pacing: PacingConfig,
}

impl AdaptiveDownloader {
    pub fn new(fetcher: SegmentFetcher, pacing: PacingConfig) -> Self {
        Self { fetcher, pacing }
    }

    pub async fn download<W>(&self, segments: &[String], sink: &mut W) -> Result<DownloadReport>
    where
        W: AsyncWrite + Unpin,
    {
        self.download_with_progress(segments, sink, |_| {}).await
    }

    /// Downloads every segment into `sink`, calling `on_progress` with the
    /// completed fraction after each write.
    ///
    /// Any failure aborts the whole download. Bytes already written are
    /// flushed and stay in the sink.
    pub async fn download_with_progress<W, F>(
        &self,
        segments: &[String],
        sink: &mut W,
        mut on_progress: F,
    ) -> Result<DownloadReport>
    where
        W: AsyncWrite + Unpin,
        F: FnMut(f64),
    {
        let mut session = DownloadSession::new(&self.pacing);
        let mut report = DownloadReport {
            segments: 0,
            bytes_written: 0,
            rate_limited: 0,
            final_delay: session.current_delay(),
        };
        let total = segments.len();

        for (index, url) in segments.iter().enumerate() {
            let payload = match self.fetch_segment(url, &mut session, &mut report).await {
                Ok(payload) => payload,
                Err(e) => {
                    warn!(segment = index + 1, total, error = %e, "segment failed");
                    sink.flush().await?;
                    return Err(e);
                }
            };

            sink.write_all(&payload).await?;
            report.segments += 1;
            report.bytes_written += payload.len() as u64;

            let pause = session.on_success();
            on_progress((index + 1) as f64 / total as f64);
            debug!(
                segment = index + 1,
                total,
                bytes = payload.len(),
                delay_ms = pause.as_millis() as u64,
                "segment written"
            );

            if index + 1 < total {
                tokio::time::sleep(pause).await;
            }
        }

        sink.flush().await?;
        report.final_delay = session.current_delay();
        info!(
            segments = report.segments,
            bytes = report.bytes_written,
            rate_limited = report.rate_limited,
            "download complete"
        );
        Ok(report)
    }

    async fn fetch_segment(
        &self,
        url: &str,
        session: &mut DownloadSession,
        report: &mut DownloadReport,
    ) -> Result<Bytes> {
        let max_attempts = self.pacing.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            match self.fetcher.fetch(url).await? {
                FetchOutcome::Blob(blob) => return self.fetcher.extract(&blob),
                FetchOutcome::RateLimited => {
                    report.rate_limited += 1;
                    if attempt == max_attempts {
                        break;
                    }
                    let backoff = session.on_rate_limited();
                    warn!(
                        url,
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        delay_ms = session.current_delay().as_millis() as u64,
                        "rate limited, backing off"
                    );
                    tokio::time::sleep(backoff).await;
                }
            }
        }

        Err(VsubError::MaxRetriesExceeded {
            url: url.to_string(),
            attempts: max_attempts,
        })
    }
}
