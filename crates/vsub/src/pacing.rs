//! Additive-decrease / multiplicative-increase pacing for sequential downloads.

use std::time::Duration;

use rand::RngExt;

use crate::config::PacingConfig;

/// Pacing state of one download call. Never shared.
#[derive(Debug, Clone)]
pub struct DownloadSession {
    current_delay: Duration,
    min_delay: Duration,
    max_delay: Duration,
    backoff_factor: f64,
    decrease_step: Duration,
    success_streak: u32,
    consecutive_successes: u32,
}

impl DownloadSession {
    pub fn new(config: &PacingConfig) -> Self {
        Self {
            current_delay: config
                .initial_delay
                .clamp(config.min_delay, config.max_delay.max(config.min_delay)),
            min_delay: config.min_delay,
            max_delay: config.max_delay.max(config.min_delay),
            backoff_factor: config.backoff_factor.max(1.0),
            decrease_step: config.decrease_step,
            success_streak: config.success_streak.max(1),
            consecutive_successes: 0,
        }
    }

    pub fn current_delay(&self) -> Duration {
        self.current_delay
    }

    pub fn consecutive_successes(&self) -> u32 {
        self.consecutive_successes
    }

    /// Grows the delay after a 429 and returns how long to back off:
    /// half the new delay plus jitter in `[0, delay / 2)`.
    pub fn on_rate_limited(&mut self) -> Duration {
        self.consecutive_successes = 0;
        self.current_delay = self
            .current_delay
            .mul_f64(self.backoff_factor)
            .min(self.max_delay);

        let half = self.current_delay / 2;
        half + half.mul_f64(rand::rng().random_range(0.0..1.0))
    }

    /// Records a written segment and returns the pause before the next one.
    pub fn on_success(&mut self) -> Duration {
        self.consecutive_successes += 1;
        if self.consecutive_successes >= self.success_streak {
            self.current_delay = self
                .current_delay
                .saturating_sub(self.decrease_step)
                .max(self.min_delay);
            self.consecutive_successes = 0;
        }
        self.current_delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> DownloadSession {
        DownloadSession::new(&PacingConfig::default())
    }

    #[test]
    fn test_backoff_is_multiplicative_and_capped() {
        let mut session = session();
        let before = session.current_delay();

        let pause = session.on_rate_limited();
        let after = session.current_delay();
        assert_eq!(after, before.mul_f64(1.8));
        assert!(pause >= after / 2 && pause < after);

        for _ in 0..20 {
            session.on_rate_limited();
        }
        assert_eq!(session.current_delay(), Duration::from_secs(2));
    }

    #[test]
    fn test_rate_limit_resets_streak() {
        let mut session = session();
        session.on_success();
        session.on_success();
        assert_eq!(session.consecutive_successes(), 2);

        session.on_rate_limited();
        assert_eq!(session.consecutive_successes(), 0);
    }

    #[test]
    fn test_streak_decreases_delay() {
        let mut session = session();
        for _ in 0..4 {
            assert_eq!(session.on_success(), Duration::from_millis(250));
        }
        assert_eq!(session.on_success(), Duration::from_millis(240));
        assert_eq!(session.consecutive_successes(), 0);
    }

    #[test]
    fn test_delay_never_below_floor() {
        let mut session = session();
        for _ in 0..1000 {
            session.on_success();
        }
        assert_eq!(session.current_delay(), Duration::from_millis(120));
    }

    #[test]
    fn test_initial_delay_is_clamped() {
        let config = PacingConfig {
            initial_delay: Duration::from_millis(5),
            ..PacingConfig::default()
        };
        assert_eq!(
            DownloadSession::new(&config).current_delay(),
            Duration::from_millis(120)
        );
    }
}
