//! Persistent schedule store.
//!
//! Sub-modules:
//! - `schema`: SQLite DDL definitions.
//! - `sqlite`: SQLite-backed `ScheduleStore`.
//! - `types`: Row types returned by the store.

pub(crate) mod schema;
pub mod sqlite;
pub mod types;

pub use sqlite::{DB_FILENAME, DEFAULT_CACHE_TTL, ScheduleStore, StoreError};
pub use types::{
    CacheEntry, CleanupReport, DatabaseInfo, GroupPopularity, GroupRecord, RequestLogEntry,
    Statistics, UserPreference, now_epoch_secs,
};
