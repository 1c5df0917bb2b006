//! Schedule bot: weekly class schedules for college student groups.
//!
//! Schedules are scraped from the college site by the `schedule-scrape`
//! crate, persisted per group and week in SQLite and served from a
//! short-lived cache.
//!
//! # Architecture
//!
//! - **Preload**: fetches every group of the catalogue once per week
//! - **Store**: durable records, TTL cache, user preferences, request log
//! - **Render**: plain-text day and week views for chat replies
//! - **Maintenance**: periodic cleanup of stale rows

pub mod bot_dirs;
pub mod config;
pub mod error;
pub mod groups;
pub mod logging;
pub mod maintenance;
pub mod preload;
pub mod render;
pub mod store;

pub use config::BotConfig;
pub use error::{BotError, Result};
pub use preload::{PreloadReport, preload_all, week_start_key};
pub use store::{ScheduleStore, StoreError};

/// Open the store configured in `config`, with its cache TTL applied.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or migrated.
pub fn open_store(config: &BotConfig) -> Result<ScheduleStore> {
    let store = ScheduleStore::open(&config.store.database_path())?;
    Ok(store.with_cache_ttl(config.store.cache_ttl()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_store_uses_configured_path_and_ttl() {
        let dir = tempfile::TempDir::new().expect("create temp dir");
        let mut config = BotConfig::default();
        config.store.database_path = Some(dir.path().join("db").join("bot.db"));
        config.store.cache_ttl_secs = 120;

        let store = open_store(&config).expect("open");
        assert_eq!(store.path(), Some(dir.path().join("db").join("bot.db").as_path()));
        assert_eq!(store.cache_ttl(), std::time::Duration::from_secs(120));
    }
}
