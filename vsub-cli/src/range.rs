//! `--episode` values: a single episode number `N` or an inclusive range `N-M`.

use std::ops::RangeInclusive;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{CliError, Result};

static RANGE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<start>\d+)(?:-(?P<end>\d+))?$").unwrap());

/// 1-based, inclusive episode range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeRange {
    pub start: u32,
    pub end: u32,
}

impl EpisodeRange {
    pub fn parse(input: &str) -> Result<Self> {
        let captures = RANGE_REGEX.captures(input.trim()).ok_or_else(|| {
            CliError::invalid_input(format!(
                "invalid episode value '{input}': must be 'N' or 'N-M'"
            ))
        })?;

        let start = parse_positive(&captures["start"], "start")?;
        let end = match captures.name("end") {
            Some(end) => parse_positive(end.as_str(), "end")?,
            None => start,
        };
        if start > end {
            return Err(CliError::invalid_input(format!(
                "invalid episode range '{input}': start is after end"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn count(&self) -> usize {
        (self.end - self.start) as usize + 1
    }

    /// Zero-based indices into an episode list of `available` entries.
    pub fn indices(&self, available: usize) -> Result<RangeInclusive<usize>> {
        if self.end as usize > available {
            return Err(CliError::invalid_input(format!(
                "invalid episode number: {} (available: 1-{available})",
                self
            )));
        }
        Ok(self.start as usize - 1..=self.end as usize - 1)
    }
}

impl std::fmt::Display for EpisodeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

fn parse_positive(value: &str, which: &str) -> Result<u32> {
    let parsed: i32 = value.parse().map_err(|_| {
        CliError::invalid_input(format!("{which} value error: number out of range or invalid"))
    })?;
    if parsed <= 0 {
        return Err(CliError::invalid_input(format!(
            "{which} value error: number must be positive (> 0)"
        )));
    }
    Ok(parsed as u32)
}
