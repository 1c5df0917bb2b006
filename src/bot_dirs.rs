//! Application directory paths for the schedule bot.
//!
//! Uses the [`dirs`] crate for platform-appropriate directory resolution.
//!
//! | Purpose | Linux | macOS |
//! |---------|-------|-------|
//! | App data | `~/.local/share/schedule-bot/` | `~/Library/Application Support/schedule-bot/` |
//! | Config | `~/.config/schedule-bot/` | `~/Library/Application Support/schedule-bot/` |
//!
//! # Environment Overrides
//!
//! - `SCHEDULE_BOT_DATA_DIR` overrides [`data_dir`]
//! - `SCHEDULE_BOT_CONFIG_DIR` overrides [`config_dir`]

use std::path::PathBuf;

const APP_DIR: &str = "schedule-bot";

/// Application data root directory: the database and logs live here.
#[must_use]
pub fn data_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("SCHEDULE_BOT_DATA_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::data_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("/tmp/schedule-bot-data"))
}

/// Application config directory.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("SCHEDULE_BOT_CONFIG_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::config_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("/tmp/schedule-bot-config"))
}

/// Main config file path (`config_dir()/config.toml`).
#[must_use]
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// Default database path (`data_dir()/schedule_bot.db`).
#[must_use]
pub fn database_file() -> PathBuf {
    data_dir().join(crate::store::DB_FILENAME)
}

/// Log file directory (`data_dir()/logs/`).
#[must_use]
pub fn logs_dir() -> PathBuf {
    data_dir().join("logs")
}
