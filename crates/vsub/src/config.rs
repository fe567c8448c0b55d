//! # Site and pacing configuration
//!
//! [`SiteConfig`] captures everything that is specific to the upstream site:
//! where it lives, which headers it insists on, the manifest secret and how
//! segments are disguised. [`PacingConfig`] tunes the adaptive downloader.
//!
//! ```
//! use std::time::Duration;
//! use vsub_engine::{ContainerStrategy, SiteConfig};
//!
//! let config = SiteConfig::builder()
//!     .with_domain("https://mirror.example.com/")
//!     .with_timeout(Duration::from_secs(10))
//!     .with_container(ContainerStrategy::fixed_offset())
//!     .build();
//!
//! assert_eq!(config.endpoint("/ajax/player"), "https://mirror.example.com/ajax/player");
//! ```

use std::time::Duration;

use crate::container::ContainerStrategy;

pub const DEFAULT_DOMAIN: &str = "https://animevietsub.show";
pub const DEFAULT_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 16_1_2 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) GSA/383.0.797833943 Mobile/15E148 Safari/604.1";
pub const DEFAULT_SECRET: &str = "dm_thang_suc_vat_get_link_an_dbt";
pub const DEFAULT_PROXY_PREFIX: &str = "chunks";

/// Upstream site settings, captured once and shared read-only.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Site origin, used as the API base and as the segment `Referer`
    pub domain: String,

    /// User agent sent with every upstream request
    pub user_agent: String,

    /// Passphrase the manifest key is derived from
    pub secret: String,

    /// How disguised segments are stripped
    pub container: ContainerStrategy,

    /// Overall timeout for a single upstream request
    pub timeout: Duration,

    /// First path component of rewritten segment URLs
    pub proxy_prefix: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            domain: DEFAULT_DOMAIN.to_string(),
            user_agent: DEFAULT_UA.to_string(),
            secret: DEFAULT_SECRET.to_string(),
            container: ContainerStrategy::default(),
            timeout: Duration::from_secs(20),
            proxy_prefix: DEFAULT_PROXY_PREFIX.to_string(),
        }
    }
}

impl SiteConfig {
    pub fn builder() -> SiteConfigBuilder {
        SiteConfigBuilder::new()
    }

    /// Joins `path` onto the site origin.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.domain.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Value sent as `Referer` on segment requests.
    pub fn referer(&self) -> &str {
        &self.domain
    }
}

/// Fluent builder for [`SiteConfig`]
#[derive(Debug, Clone, Default)]
pub struct SiteConfigBuilder {
    config: SiteConfig,
}

impl SiteConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.config.domain = domain.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.config.secret = secret.into();
        self
    }

    pub fn with_container(mut self, container: ContainerStrategy) -> Self {
        self.config.container = container;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Leading and trailing slashes are dropped. An empty prefix keeps
    /// [`DEFAULT_PROXY_PREFIX`].
    pub fn with_proxy_prefix(mut self, prefix: impl AsRef<str>) -> Self {
        let prefix = prefix.as_ref().trim_matches('/');
        self.config.proxy_prefix = if prefix.is_empty() {
            DEFAULT_PROXY_PREFIX.to_string()
        } else {
            prefix.to_string()
        };
        self
    }

    pub fn build(self) -> SiteConfig {
        self.config
    }
}

/// Tuning of the adaptive pacing loop.
#[derive(Debug, Clone)]
pub struct PacingConfig {
    /// Pause between segments at the start of a download
    pub initial_delay: Duration,
    /// Floor the pause never drops below
    pub min_delay: Duration,
    /// Ceiling of the multiplicative backoff
    pub max_delay: Duration,
    /// Factor applied to the pause on every rate-limit response
    pub backoff_factor: f64,
    /// Amount the pause shrinks after a streak of successes
    pub decrease_step: Duration,
    /// Successes needed before the pause shrinks
    pub success_streak: u32,
    /// Attempts per segment before giving up
    pub max_attempts: u32,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(250),
            min_delay: Duration::from_millis(120),
            max_delay: Duration::from_secs(2),
            backoff_factor: 1.8,
            decrease_step: Duration::from_millis(10),
            success_streak: 5,
            max_attempts: 10,
        }
    }
}
