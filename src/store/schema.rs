//! SQLite DDL definitions for the schedule store.
//!
//! All `CREATE TABLE` / `CREATE INDEX` statements live here so they are
//! reviewable and testable in isolation.

use rusqlite::Connection;

/// Current schema version stamped into `schema_meta`.
pub(crate) const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Complete DDL for the schedule database.
///
/// Uses `IF NOT EXISTS` throughout so `apply_schema` is idempotent.
/// Timestamps are UTC epoch seconds.
pub(crate) const SCHEMA_SQL: &str = r#"
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS schema_meta (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

-- Durable schedule per (group, week). Stale rows are deactivated, never deleted.
CREATE TABLE IF NOT EXISTS schedules (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    group_name    TEXT NOT NULL,
    week_start    TEXT NOT NULL,
    schedule_data TEXT NOT NULL,             -- WeekSchedule JSON
    created_at    INTEGER NOT NULL,
    updated_at    INTEGER NOT NULL,
    is_active     INTEGER NOT NULL DEFAULT 1,
    UNIQUE(group_name, week_start)
);

CREATE INDEX IF NOT EXISTS idx_schedules_group   ON schedules(group_name, is_active);
CREATE INDEX IF NOT EXISTS idx_schedules_updated ON schedules(updated_at);

-- Short-lived copy of the last schedule written or read per group.
CREATE TABLE IF NOT EXISTS cache (
    group_name TEXT PRIMARY KEY,
    week_start TEXT NOT NULL,
    data       TEXT NOT NULL,
    cached_at  INTEGER NOT NULL,
    expire_at  INTEGER NOT NULL,
    CHECK (expire_at > cached_at)
);

CREATE INDEX IF NOT EXISTS idx_cache_expire ON cache(expire_at);

CREATE TABLE IF NOT EXISTS users (
    user_id       INTEGER PRIMARY KEY,
    group_name    TEXT NOT NULL,
    last_activity INTEGER NOT NULL,
    updated_at    INTEGER NOT NULL
);

-- Append-only request log.
CREATE TABLE IF NOT EXISTS logs (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id    INTEGER NOT NULL,
    group_name TEXT NOT NULL,
    day        TEXT NOT NULL,
    timestamp  INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_logs_timestamp ON logs(timestamp);
CREATE INDEX IF NOT EXISTS idx_logs_group     ON logs(group_name);
"#;

/// Apply the full schema to an open connection.
///
/// Safe to call multiple times. Seeds the schema version on a fresh
/// database.
pub(crate) fn apply_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', ?1)",
        rusqlite::params![CURRENT_SCHEMA_VERSION.to_string()],
    )?;

    Ok(())
}

/// Read the current schema version from the database.
///
/// Returns `None` if the key is missing.
pub(crate) fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<u32>> {
    let mut stmt = conn.prepare("SELECT value FROM schema_meta WHERE key = 'schema_version'")?;
    let mut rows = stmt.query([])?;
    match rows.next()? {
        Some(row) => {
            let val: String = row.get(0)?;
            Ok(val.parse::<u32>().ok())
        }
        None => Ok(None),
    }
}
