//! Row types returned by the schedule store.

use std::collections::BTreeMap;
use std::path::PathBuf;

use schedule_scrape::WeekSchedule;
use serde::Serialize;

/// Durable schedule of one group for one week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRecord {
    pub id: i64,
    pub group_name: String,
    /// Week identifier, `YYYY-MM-DD` of the week's Monday.
    pub week_start: String,
    pub schedule: WeekSchedule,
    pub created_at: i64,
    pub updated_at: i64,
    pub is_active: bool,
}

/// Cached schedule for a group. Valid while `expire_at` is in the future.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub group_name: String,
    pub week_start: String,
    pub schedule: WeekSchedule,
    pub cached_at: i64,
    pub expire_at: i64,
}

impl CacheEntry {
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expire_at <= now
    }
}

/// The group a chat user last picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPreference {
    pub user_id: i64,
    pub group_name: String,
    pub last_activity: i64,
    pub updated_at: i64,
}

/// One schedule request made by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLogEntry {
    pub user_id: i64,
    pub group_name: String,
    pub day: String,
    pub timestamp: i64,
}

/// Request count of one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupPopularity {
    pub group_name: String,
    pub count: u64,
}

/// Usage statistics shown to administrators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub total_users: u64,
    pub total_requests: u64,
    /// At most five groups, most requested first.
    pub popular_groups: Vec<GroupPopularity>,
}

/// Location and per-table row counts of the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseInfo {
    /// `None` for an in-memory database.
    pub path: Option<PathBuf>,
    pub tables: BTreeMap<String, u64>,
}

/// What a cleanup sweep changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub deleted_logs: usize,
    pub deactivated_schedules: usize,
    pub deleted_cache_entries: usize,
}

impl CleanupReport {
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

/// Current UTC time as epoch seconds.
pub fn now_epoch_secs() -> i64 {
    chrono::Utc::now().timestamp()
}
