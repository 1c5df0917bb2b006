//! Configuration types for the schedule bot.
//!
//! Stored as TOML; every section falls back to its defaults when absent.

use std::path::{Path, PathBuf};
use std::time::Duration;

use schedule_scrape::ScrapeConfig;
use serde::{Deserialize, Serialize};

use crate::error::{BotError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Schedule site and fetch pacing.
    pub scrape: ScrapeConfig,
    /// Database and cache settings.
    pub store: StoreConfig,
    /// Log output settings.
    pub logging: LoggingConfig,
}

/// Schedule store settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Database file. Defaults to `<data_dir>/schedule_bot.db`.
    pub database_path: Option<PathBuf>,
    /// Lifetime of cached schedules in seconds.
    pub cache_ttl_secs: u64,
    /// Age in days after which logs are deleted and schedules deactivated.
    pub cleanup_days: u32,
    /// How often the maintenance loop runs cleanup, in seconds.
    pub cleanup_interval_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            cache_ttl_secs: 3600,
            cleanup_days: 1,
            cleanup_interval_secs: 3600,
        }
    }
}

impl StoreConfig {
    /// Configured database path, or the platform default.
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(crate::bot_dirs::database_file)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for the rolling log file. Defaults to `<data_dir>/logs`.
    pub log_dir: Option<PathBuf>,
    /// Write logs to a daily-rolling file in addition to stderr.
    pub file_logging: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: None,
            file_logging: true,
        }
    }
}

impl LoggingConfig {
    /// Directory the log file is written to, `None` when file logging is off.
    pub fn effective_log_dir(&self) -> Option<PathBuf> {
        if !self.file_logging {
            return None;
        }
        Some(self.log_dir.clone().unwrap_or_else(crate::bot_dirs::logs_dir))
    }
}

impl BotConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// scrape section is invalid.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| BotError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load the file at `path` if it exists, otherwise the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| BotError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `<config_dir>/config.toml`.
    pub fn default_config_path() -> PathBuf {
        crate::bot_dirs::config_file()
    }

    /// Check every section.
    pub fn validate(&self) -> Result<()> {
        self.scrape.validate()?;
        if self.store.cache_ttl_secs == 0 {
            return Err(BotError::Config(
                "store.cache_ttl_secs must be greater than 0".into(),
            ));
        }
        if self.store.cleanup_interval_secs == 0 {
            return Err(BotError::Config(
                "store.cleanup_interval_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = BotConfig::default();
        config.validate().expect("defaults validate");
        assert_eq!(config.store.cache_ttl(), Duration::from_secs(3600));
        assert_eq!(config.store.cleanup_days, 1);
        assert_eq!(config.scrape.batch_size, 5);
    }

    #[test]
    fn round_trips_through_file() {
        let dir = tempfile::TempDir::new().expect("create temp dir");
        let path = dir.path().join("nested").join("config.toml");

        let mut config = BotConfig::default();
        config.store.database_path = Some(dir.path().join("bot.db"));
        config.store.cleanup_days = 7;
        config.scrape.batch_delay_ms = 250;
        config.logging.file_logging = false;
        config.save_to_file(&path).expect("save");

        let loaded = BotConfig::from_file(&path).expect("load");
        assert_eq!(loaded, config);
        assert_eq!(loaded.store.database_path(), dir.path().join("bot.db"));
        assert_eq!(loaded.logging.effective_log_dir(), None);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::TempDir::new().expect("create temp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[store]\ncleanup_days = 3\n").expect("write");

        let loaded = BotConfig::from_file(&path).expect("load");
        assert_eq!(loaded.store.cleanup_days, 3);
        assert_eq!(loaded.store.cache_ttl_secs, 3600);
        assert_eq!(loaded.scrape, ScrapeConfig::default());
    }

    #[test]
    fn from_file_nonexistent_returns_error() {
        let result = BotConfig::from_file(Path::new("/nonexistent/path/config.toml"));
        assert!(matches!(result, Err(BotError::Io(_))));
    }

    #[test]
    fn from_file_invalid_toml_returns_error() {
        let dir = tempfile::TempDir::new().expect("create temp dir");
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "this is not valid toml {{{").expect("write");
        assert!(matches!(BotConfig::from_file(&path), Err(BotError::Config(_))));
    }

    #[test]
    fn invalid_scrape_section_is_rejected() {
        let dir = tempfile::TempDir::new().expect("create temp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[scrape]\ntimeout_seconds = 0\n").expect("write");
        assert!(matches!(BotConfig::from_file(&path), Err(BotError::Scrape(_))));
    }

    #[test]
    fn zero_cache_ttl_is_rejected() {
        let mut config = BotConfig::default();
        config.store.cache_ttl_secs = 0;
        assert!(matches!(config.validate(), Err(BotError::Config(_))));
    }

    #[test]
    fn load_or_default_without_file() {
        let dir = tempfile::TempDir::new().expect("create temp dir");
        let loaded = BotConfig::load_or_default(&dir.path().join("missing.toml")).expect("load");
        assert_eq!(loaded, BotConfig::default());
    }

    #[test]
    fn default_config_path_ends_with_config_toml() {
        let path = BotConfig::default_config_path();
        assert!(path.to_string_lossy().ends_with("config.toml"));
    }
}
