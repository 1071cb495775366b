//! Runtime configuration, loaded from an optional YAML file.
//!
//! Every key has a default matching the production deployment, so an empty
//! file (or no file at all) yields a working configuration.
//!
//! ```yaml
//! archive_path: ./files/daily_reflections.txt
//! snapshot_dir: ./files/snapshots
//! cache_expiry_secs: 300
//! deadline_secs: 60
//! just_for_today:
//!   url: https://www.jftna.org/jft/
//!   retry_attempts: 3
//!   retry_delay_secs: 5
//!   timeout_secs: 10
//! spiritual_principle:
//!   url: https://www.spadna.org/
//! ```

use crate::error::ConfigError;
use crate::retry::RetryPolicy;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};
use url::Url;

pub const JFT_URL: &str = "https://www.jftna.org/jft/";
pub const SPAD_URL: &str = "https://www.spadna.org/";

/// Settings for one remote source. `url` is required when the section is given.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    pub url: String,
    /// Total attempts per fetch; must be at least 1.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    /// Fixed wait between attempts.
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
    /// Per-attempt request timeout; must be at least 1.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_delay_secs() -> u64 {
    5
}

fn default_timeout_secs() -> u64 {
    10
}

impl SiteConfig {
    fn with_url(url: &str) -> Self {
        Self {
            url: url.to_string(),
            retry_attempts: default_retry_attempts(),
            retry_delay_secs: default_retry_delay_secs(),
            timeout_secs: default_timeout_secs(),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry_attempts,
            Duration::from_secs(self.retry_delay_secs),
            Duration::from_secs(self.timeout_secs),
        )
    }

    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        Url::parse(&self.url)
            .map_err(|e| ConfigError::Invalid(format!("{name}.url {:?}: {e}", self.url)))?;
        if self.retry_attempts == 0 {
            return Err(ConfigError::Invalid(format!(
                "{name}.retry_attempts must be at least 1"
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid(format!(
                "{name}.timeout_secs must be at least 1"
            )));
        }
        Ok(())
    }
}

fn default_jft() -> SiteConfig {
    SiteConfig::with_url(JFT_URL)
}

fn default_spad() -> SiteConfig {
    SiteConfig::with_url(SPAD_URL)
}

/// The full pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_archive_path")]
    pub archive_path: PathBuf,
    #[serde(default = "default_snapshot_dir")]
    pub snapshot_dir: PathBuf,
    #[serde(default = "default_cache_expiry_secs")]
    pub cache_expiry_secs: u64,
    /// Optional bound on one assembly's live fetching.
    #[serde(default)]
    pub deadline_secs: Option<u64>,
    #[serde(default = "default_jft")]
    pub just_for_today: SiteConfig,
    #[serde(default = "default_spad")]
    pub spiritual_principle: SiteConfig,
}

fn default_archive_path() -> PathBuf {
    PathBuf::from("./files/daily_reflections.txt")
}

fn default_snapshot_dir() -> PathBuf {
    PathBuf::from("./files/snapshots")
}

fn default_cache_expiry_secs() -> u64 {
    300
}

impl Default for Config {
    fn default() -> Self {
        Self {
            archive_path: default_archive_path(),
            snapshot_dir: default_snapshot_dir(),
            cache_expiry_secs: default_cache_expiry_secs(),
            deadline_secs: None,
            just_for_today: default_jft(),
            spiritual_principle: default_spad(),
        }
    }
}

impl Config {
    /// Parse and validate YAML text.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config: Config = if text.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(text)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, or use defaults when no path is given.
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            info!("No config file given; using defaults");
            let config = Config::default();
            config.validate()?;
            return Ok(config);
        };
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_yaml(&text)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.just_for_today.validate("just_for_today")?;
        self.spiritual_principle.validate("spiritual_principle")?;
        if self.deadline_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "deadline_secs must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }

    pub fn cache_expiry(&self) -> Duration {
        Duration::from_secs(self.cache_expiry_secs)
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }
}
