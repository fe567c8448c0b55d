use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use vsub_engine::config::{DEFAULT_DOMAIN, DEFAULT_PROXY_PREFIX, DEFAULT_SECRET, DEFAULT_UA};
use vsub_engine::{ContainerStrategy, PacingConfig, SiteConfig};

const APP_NAME: &str = "vsub";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub site: SiteSection,
    pub pacing: PacingSection,
    pub server: ServerSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSection {
    /// Site origin
    pub domain: String,

    /// User agent string for requests
    pub user_agent: String,

    /// Manifest key passphrase
    pub secret: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Path prefix of proxied segments
    pub proxy_prefix: String,

    /// How disguised segments are unwrapped
    pub container: ContainerStrategy,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            domain: DEFAULT_DOMAIN.to_string(),
            user_agent: DEFAULT_UA.to_string(),
            secret: DEFAULT_SECRET.to_string(),
            timeout_secs: 20,
            proxy_prefix: DEFAULT_PROXY_PREFIX.to_string(),
            container: ContainerStrategy::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingSection {
    pub initial_delay_ms: u64,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_factor: f64,
    pub decrease_step_ms: u64,
    pub success_streak: u32,
    pub max_attempts: u32,
}

impl Default for PacingSection {
    fn default() -> Self {
        let pacing = PacingConfig::default();
        Self {
            initial_delay_ms: pacing.initial_delay.as_millis() as u64,
            min_delay_ms: pacing.min_delay.as_millis() as u64,
            max_delay_ms: pacing.max_delay.as_millis() as u64,
            backoff_factor: pacing.backoff_factor,
            decrease_step_ms: pacing.decrease_step.as_millis() as u64,
            success_streak: pacing.success_streak,
            max_attempts: pacing.max_attempts,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Address the proxy listens on
    pub bind: SocketAddr,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8000)),
        }
    }
}

impl AppConfig {
    /// Load configuration from an explicit file or the default location
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        match config_path {
            Some(path) => {
                if path.exists() {
                    let content = std::fs::read_to_string(path)
                        .context("Failed to read configuration file")?;
                    toml::from_str(&content).context("Failed to parse configuration file")
                } else {
                    Ok(Self::default())
                }
            }
            None => confy::load(APP_NAME, None).context("Failed to load configuration"),
        }
    }

    /// Get default configuration file path
    pub fn default_config_path() -> Option<PathBuf> {
        confy::get_configuration_file_path(APP_NAME, None).ok()
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let toml_string =
            toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(path, toml_string).context("Failed to write configuration file")?;

        Ok(())
    }

    /// Reset configuration to defaults and save
    pub fn reset(config_path: Option<&Path>) -> Result<()> {
        let path = config_path
            .map(|p| p.to_path_buf())
            .or_else(Self::default_config_path)
            .context("No configuration path available")?;

        Self::default().save(&path)
    }

    /// Show current configuration as a formatted string
    pub fn show(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration for display")
    }

    /// Applies command-line overrides on top of the loaded values
    pub fn with_overrides(mut self, domain: Option<String>, timeout_secs: Option<u64>) -> Self {
        if let Some(domain) = domain {
            self.site.domain = domain;
        }
        if let Some(timeout) = timeout_secs {
            self.site.timeout_secs = timeout;
        }
        self
    }

    pub fn site_config(&self) -> SiteConfig {
        SiteConfig::builder()
            .with_domain(self.site.domain.clone())
            .with_user_agent(self.site.user_agent.clone())
            .with_secret(self.site.secret.clone())
            .with_timeout(Duration::from_secs(self.site.timeout_secs))
            .with_proxy_prefix(&self.site.proxy_prefix)
            .with_container(self.site.container)
            .build()
    }

    pub fn pacing_config(&self) -> PacingConfig {
        let pacing = &self.pacing;
        PacingConfig {
            initial_delay: Duration::from_millis(pacing.initial_delay_ms),
            min_delay: Duration::from_millis(pacing.min_delay_ms),
            max_delay: Duration::from_millis(pacing.max_delay_ms),
            backoff_factor: pacing.backoff_factor,
            decrease_step: Duration::from_millis(pacing.decrease_step_ms),
            success_streak: pacing.success_streak,
            max_attempts: pacing.max_attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.site.domain, DEFAULT_DOMAIN);
        assert_eq!(config.server.bind, "127.0.0.1:8000".parse().unwrap());
        assert_eq!(config.pacing_config().initial_delay, Duration::from_millis(250));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vsub.toml");
        std::fs::write(
            &path,
            r#"
[site]
domain = "https://mirror.example"

[site.container]
mode = "fixed-offset"
offset = 128

[pacing]
max_attempts = 3
"#,
        )
        .unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        let site = config.site_config();
        assert_eq!(site.domain, "https://mirror.example");
        assert_eq!(site.container, ContainerStrategy::FixedOffset { offset: 128 });
        assert_eq!(site.user_agent, DEFAULT_UA);
        assert_eq!(config.pacing_config().max_attempts, 3);
        assert_eq!(config.pacing_config().success_streak, 5);
    }

    #[test]
    fn test_reset_then_show_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("vsub.toml");
        AppConfig::reset(Some(&path)).unwrap();

        let loaded = AppConfig::load(Some(&path)).unwrap();
        let shown = loaded.show().unwrap();
        assert!(shown.contains("[site]"));
        assert!(shown.contains("timeout_secs = 20"));
        assert!(shown.contains("bind = \"127.0.0.1:8000\""));
    }

    #[test]
    fn test_overrides() {
        let config =
            AppConfig::default().with_overrides(Some("http://127.0.0.1:1".to_string()), Some(3));
        let site = config.site_config();
        assert_eq!(site.domain, "http://127.0.0.1:1");
        assert_eq!(site.timeout, Duration::from_secs(3));
    }
}
