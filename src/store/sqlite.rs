//! SQLite-backed schedule store.
//!
//! One database file holds the durable schedules, the short-lived cache,
//! user preferences and the request log. Reads go cache first; a durable hit
//! repopulates the cache, so the staleness of any answer is bounded by the
//! cache TTL.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rusqlite::{Connection, OptionalExtension, params};
use schedule_scrape::WeekSchedule;

use super::schema::{apply_schema, read_schema_version};
use super::types::{
    CacheEntry, CleanupReport, DatabaseInfo, GroupPopularity, GroupRecord, RequestLogEntry,
    Statistics, UserPreference, now_epoch_secs,
};

/// Database filename used when the store is opened from a directory.
pub const DB_FILENAME: &str = "schedule_bot.db";

/// Default lifetime of a cache entry.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Number of groups reported by [`ScheduleStore::statistics`].
const POPULAR_GROUPS_LIMIT: i64 = 5;

const SECS_PER_DAY: i64 = 86_400;

/// SQLite-backed schedule store.
///
/// Thread-safe via an internal `Mutex<Connection>`; share it as
/// `Arc<ScheduleStore>`. A store only exists once its connection is open and
/// the schema applied, so every operation has a live connection.
pub struct ScheduleStore {
    path: Option<PathBuf>,
    conn: Mutex<Connection>,
    cache_ttl: Duration,
}

impl ScheduleStore {
    /// Open (or create) the database file at `path`, creating parent
    /// directories as needed.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Io(e.to_string()))?;
        }
        let conn = Connection::open(path)?;
        apply_schema(&conn)?;
        tracing::info!(path = %path.display(), "schedule store opened");
        Ok(Self {
            path: Some(path.to_path_buf()),
            conn: Mutex::new(conn),
            cache_ttl: DEFAULT_CACHE_TTL,
        })
    }

    /// Open `{dir}/schedule_bot.db`.
    pub fn open_in_dir(dir: &Path) -> Result<Self, StoreError> {
        Self::open(&dir.join(DB_FILENAME))
    }

    /// A private in-memory database, used by tests and dry runs.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self {
            path: None,
            conn: Mutex::new(conn),
            cache_ttl: DEFAULT_CACHE_TTL,
        })
    }

    /// Override the cache TTL. Clamped to at least one second.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl.max(Duration::from_secs(1));
        self
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    /// Database file path, `None` when in memory.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn schema_version(&self) -> Result<Option<u32>, StoreError> {
        let conn = self.lock()?;
        Ok(read_schema_version(&conn)?)
    }

    /// Close the connection, reporting any error SQLite returns on close.
    pub fn close(self) -> Result<(), StoreError> {
        let conn = self
            .conn
            .into_inner()
            .map_err(|e| StoreError::Lock(e.to_string()))?;
        conn.close().map_err(|(_, e)| StoreError::Sqlite(e))?;
        tracing::info!("schedule store closed");
        Ok(())
    }

    /// Run `op` against a shared store on tokio's blocking pool.
    ///
    /// Store calls are synchronous SQLite work; async callers go through
    /// this so they never block an executor thread.
    pub async fn blocking<T, F>(self: &Arc<Self>, op: F) -> Result<T, StoreError>
    where
        F: FnOnce(&ScheduleStore) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(self);
        tokio::task::spawn_blocking(move || op(&store))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))?
    }

    // -----------------------------------------------------------------------
    // Schedules
    // -----------------------------------------------------------------------

    /// Upsert the schedule of `group` for `week_start`, mark it active and
    /// refresh the group's cache entry. Returns the record id.
    ///
    /// An empty schedule is a valid "nothing published yet" record.
    pub fn save_schedule(
        &self,
        group: &str,
        schedule: &WeekSchedule,
        week_start: &str,
    ) -> Result<i64, StoreError> {
        let data = schedule
            .to_json()
            .map_err(|e| StoreError::Serialize(e.to_string()))?;
        let conn = self.lock()?;
        let now = now_epoch_secs();

        let tx = conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO schedules \
             (group_name, week_start, schedule_data, created_at, updated_at, is_active) \
             VALUES (?1, ?2, ?3, ?4, ?4, 1) \
             ON CONFLICT(group_name, week_start) DO UPDATE SET \
             schedule_data = excluded.schedule_data, \
             updated_at = excluded.updated_at, \
             is_active = 1",
            params![group, week_start, data, now],
        )?;
        let id: i64 = tx.query_row(
            "SELECT id FROM schedules WHERE group_name = ?1 AND week_start = ?2",
            params![group, week_start],
            |row| row.get(0),
        )?;
        write_cache(&tx, group, week_start, &data, now, self.cache_ttl)?;
        tx.commit()?;

        tracing::info!(group, week_start, id, days = schedule.days.len(), "schedule saved");
        Ok(id)
    }

    /// Schedule of `group`, cache first.
    ///
    /// With `week_start`, only that week is returned; without it, the most
    /// recently updated active record. The cache is repopulated only from the
    /// group's most recent active record, so looking up an older week never
    /// replaces what unscoped readers see. Returns `Ok(None)` when neither
    /// layer has the group.
    pub fn get_schedule(
        &self,
        group: &str,
        week_start: Option<&str>,
    ) -> Result<Option<WeekSchedule>, StoreError> {
        let conn = self.lock()?;
        let now = now_epoch_secs();

        let cached: Option<(String, String)> = conn
            .query_row(
                "SELECT week_start, data FROM cache WHERE group_name = ?1 AND expire_at > ?2",
                params![group, now],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        if let Some((cached_week, data)) = cached {
            if week_start.is_none_or(|w| w == cached_week) {
                tracing::debug!(group, week_start = %cached_week, "schedule cache hit");
                return decode(group, &data).map(Some);
            }
        }

        let row: Option<(String, String)> = match week_start {
            Some(week) => conn
                .query_row(
                    "SELECT week_start, schedule_data FROM schedules \
                     WHERE group_name = ?1 AND week_start = ?2 AND is_active = 1",
                    params![group, week],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?,
            None => conn
                .query_row(
                    "SELECT week_start, schedule_data FROM schedules \
                     WHERE group_name = ?1 AND is_active = 1 \
                     ORDER BY updated_at DESC, id DESC LIMIT 1",
                    params![group],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?,
        };
        let Some((found_week, data)) = row else {
            tracing::debug!(group, ?week_start, "schedule not found");
            return Ok(None);
        };
        let schedule = decode(group, &data)?;

        if latest_active_week(&conn, group)?.as_deref() == Some(found_week.as_str()) {
            write_cache(&conn, group, &found_week, &data, now, self.cache_ttl)?;
        }

        Ok(Some(schedule))
    }

    /// All records of `group`, active or not, newest first.
    pub fn group_records(&self, group: &str) -> Result<Vec<GroupRecord>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, group_name, week_start, schedule_data, created_at, updated_at, is_active \
             FROM schedules WHERE group_name = ?1 ORDER BY updated_at DESC, id DESC",
        )?;
        let rows = stmt.query_map(params![group], raw_record)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?.decode()?);
        }
        Ok(records)
    }

    /// The latest active record of every group, ordered by group name.
    pub fn latest_schedules(&self) -> Result<Vec<GroupRecord>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, group_name, week_start, schedule_data, created_at, updated_at, is_active \
             FROM schedules s \
             WHERE is_active = 1 AND id = ( \
                 SELECT t.id FROM schedules t \
                 WHERE t.group_name = s.group_name AND t.is_active = 1 \
                 ORDER BY t.updated_at DESC, t.id DESC LIMIT 1) \
             ORDER BY group_name",
        )?;
        let rows = stmt.query_map([], raw_record)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?.decode()?);
        }
        Ok(records)
    }

    /// The cache entry of `group`, expired or not.
    pub fn cache_entry(&self, group: &str) -> Result<Option<CacheEntry>, StoreError> {
        let conn = self.lock()?;
        let row: Option<(String, String, i64, i64)> = conn
            .query_row(
                "SELECT week_start, data, cached_at, expire_at FROM cache WHERE group_name = ?1",
                params![group],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;
        row.map(|(week_start, data, cached_at, expire_at)| -> Result<CacheEntry, StoreError> {
            Ok(CacheEntry {
                group_name: group.to_owned(),
                week_start,
                schedule: decode(group, &data)?,
                cached_at,
                expire_at,
            })
        })
        .transpose()
    }

    // -----------------------------------------------------------------------
    // Users and request log
    // -----------------------------------------------------------------------

    /// Group last chosen by `user_id`.
    pub fn get_user_group(&self, user_id: i64) -> Result<Option<String>, StoreError> {
        let conn = self.lock()?;
        Ok(conn
            .query_row(
                "SELECT group_name FROM users WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?)
    }

    pub fn user_preference(&self, user_id: i64) -> Result<Option<UserPreference>, StoreError> {
        let conn = self.lock()?;
        Ok(conn
            .query_row(
                "SELECT user_id, group_name, last_activity, updated_at FROM users \
                 WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok(UserPreference {
                        user_id: row.get(0)?,
                        group_name: row.get(1)?,
                        last_activity: row.get(2)?,
                        updated_at: row.get(3)?,
                    })
                },
            )
            .optional()?)
    }

    /// Remember `group` for `user_id`; the last write wins.
    pub fn save_user_preference(&self, user_id: i64, group: &str) -> Result<(), StoreError> {
        let conn = self.lock()?;
        let now = now_epoch_secs();
        conn.execute(
            "INSERT INTO users (user_id, group_name, last_activity, updated_at) \
             VALUES (?1, ?2, ?3, ?3) \
             ON CONFLICT(user_id) DO UPDATE SET \
             group_name = excluded.group_name, \
             last_activity = excluded.last_activity, \
             updated_at = excluded.updated_at",
            params![user_id, group, now],
        )?;
        tracing::debug!(user_id, group, "user preference saved");
        Ok(())
    }

    /// Append a request to the log. Failures are logged and swallowed so
    /// they never break the request being served.
    pub fn log_request(&self, user_id: i64, group: &str, day: &str) {
        if let Err(err) = self.insert_request(user_id, group, day) {
            tracing::warn!(user_id, group, day, error = %err, "failed to log request");
        }
    }

    fn insert_request(&self, user_id: i64, group: &str, day: &str) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO logs (user_id, group_name, day, timestamp) VALUES (?1, ?2, ?3, ?4)",
            params![user_id, group, day, now_epoch_secs()],
        )?;
        Ok(())
    }

    /// The most recent `limit` requests, newest first.
    pub fn recent_requests(&self, limit: usize) -> Result<Vec<RequestLogEntry>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT user_id, group_name, day, timestamp FROM logs \
             ORDER BY timestamp DESC, id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(RequestLogEntry {
                user_id: row.get(0)?,
                group_name: row.get(1)?,
                day: row.get(2)?,
                timestamp: row.get(3)?,
            })
        })?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    // -----------------------------------------------------------------------
    // Maintenance and reporting
    // -----------------------------------------------------------------------

    /// Delete request logs older than `days_old` days, deactivate schedules
    /// not updated within that window and delete expired cache entries.
    pub fn cleanup(&self, days_old: u32) -> Result<CleanupReport, StoreError> {
        let conn = self.lock()?;
        let now = now_epoch_secs();
        let cutoff = now.saturating_sub(i64::from(days_old).saturating_mul(SECS_PER_DAY));

        let tx = conn.unchecked_transaction()?;
        let deleted_logs = tx.execute("DELETE FROM logs WHERE timestamp < ?1", params![cutoff])?;
        let deactivated_schedules = tx.execute(
            "UPDATE schedules SET is_active = 0 WHERE updated_at < ?1 AND is_active = 1",
            params![cutoff],
        )?;
        let deleted_cache_entries =
            tx.execute("DELETE FROM cache WHERE expire_at <= ?1", params![now])?;
        tx.commit()?;

        let report = CleanupReport {
            deleted_logs,
            deactivated_schedules,
            deleted_cache_entries,
        };
        tracing::info!(
            days_old,
            deleted_logs,
            deactivated_schedules,
            deleted_cache_entries,
            "cleanup finished"
        );
        Ok(report)
    }

    /// Distinct users, total requests and the five most requested groups.
    /// Ties keep the order in which groups were first requested.
    pub fn statistics(&self) -> Result<Statistics, StoreError> {
        let conn = self.lock()?;
        let total_users: i64 =
            conn.query_row("SELECT COUNT(DISTINCT user_id) FROM users", [], |row| {
                row.get(0)
            })?;
        let total_requests: i64 =
            conn.query_row("SELECT COUNT(*) FROM logs", [], |row| row.get(0))?;

        let mut stmt = conn.prepare(
            "SELECT group_name, COUNT(*) AS requests, MIN(id) AS first_seen FROM logs \
             GROUP BY group_name ORDER BY requests DESC, first_seen ASC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![POPULAR_GROUPS_LIMIT], |row| {
            let count: i64 = row.get(1)?;
            Ok(GroupPopularity {
                group_name: row.get(0)?,
                count: count.max(0) as u64,
            })
        })?;
        let mut popular_groups = Vec::new();
        for row in rows {
            popular_groups.push(row?);
        }

        Ok(Statistics {
            total_users: total_users.max(0) as u64,
            total_requests: total_requests.max(0) as u64,
            popular_groups,
        })
    }

    /// Database path and row count of every table.
    pub fn database_info(&self) -> Result<DatabaseInfo, StoreError> {
        let conn = self.lock()?;
        let names: Vec<String> = {
            let mut stmt = conn.prepare(
                "SELECT name FROM sqlite_master \
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
            )?;
            let rows = stmt.query_map([], |row| row.get(0))?;
            rows.collect::<rusqlite::Result<_>>()?
        };

        let mut tables = BTreeMap::new();
        for name in names {
            let quoted = name.replace('"', "\"\"");
            let count: i64 =
                conn.query_row(&format!("SELECT COUNT(*) FROM \"{quoted}\""), [], |row| {
                    row.get(0)
                })?;
            tables.insert(name, count.max(0) as u64);
        }

        Ok(DatabaseInfo {
            path: self.path.clone(),
            tables,
        })
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    /// Acquire the connection mutex.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Lock(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors from the schedule store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("lock poisoned: {0}")]
    Lock(String),

    /// A persisted schedule payload no longer parses.
    #[error("corrupt schedule payload for group {group}: {reason}")]
    CorruptPayload { group: String, reason: String },

    #[error("failed to serialize schedule: {0}")]
    Serialize(String),

    /// A blocking store task panicked or was cancelled.
    #[error("store task failed: {0}")]
    Task(String),
}

// ---------------------------------------------------------------------------
// Row helpers
// ---------------------------------------------------------------------------

/// A `schedules` row before its payload is decoded.
struct RawRecord {
    id: i64,
    group_name: String,
    week_start: String,
    data: String,
    created_at: i64,
    updated_at: i64,
    is_active: bool,
}

impl RawRecord {
    fn decode(self) -> Result<GroupRecord, StoreError> {
        let schedule = decode(&self.group_name, &self.data)?;
        Ok(GroupRecord {
            id: self.id,
            group_name: self.group_name,
            week_start: self.week_start,
            schedule,
            created_at: self.created_at,
            updated_at: self.updated_at,
            is_active: self.is_active,
        })
    }
}

fn raw_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRecord> {
    Ok(RawRecord {
        id: row.get(0)?,
        group_name: row.get(1)?,
        week_start: row.get(2)?,
        data: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
        is_active: row.get(6)?,
    })
}

fn decode(group: &str, data: &str) -> Result<WeekSchedule, StoreError> {
    WeekSchedule::from_json(data).map_err(|e| {
        tracing::error!(group, error = %e, "corrupt schedule payload");
        StoreError::CorruptPayload {
            group: group.to_owned(),
            reason: e.to_string(),
        }
    })
}

fn write_cache(
    conn: &Connection,
    group: &str,
    week_start: &str,
    data: &str,
    now: i64,
    ttl: Duration,
) -> Result<(), StoreError> {
    let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX).max(1);
    conn.execute(
        "INSERT INTO cache (group_name, week_start, data, cached_at, expire_at) \
         VALUES (?1, ?2, ?3, ?4, ?5) \
         ON CONFLICT(group_name) DO UPDATE SET \
         week_start = excluded.week_start, \
         data = excluded.data, \
         cached_at = excluded.cached_at, \
         expire_at = excluded.expire_at",
        params![group, week_start, data, now, now.saturating_add(ttl_secs)],
    )?;
    Ok(())
}

fn latest_active_week(conn: &Connection, group: &str) -> Result<Option<String>, StoreError> {
    Ok(conn
        .query_row(
            "SELECT week_start FROM schedules WHERE group_name = ?1 AND is_active = 1 \
             ORDER BY updated_at DESC, id DESC LIMIT 1",
            params![group],
            |row| row.get(0),
        )
        .optional()?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
