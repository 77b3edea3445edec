//! Schema migrations
//!
//! The applied version lives in SQLite's `user_version` pragma. Each entry in
//! [`MIGRATIONS`] moves the schema one version forward.

use rusqlite::Connection;
use tracing::{info, instrument};

use crate::error::Result;

/// Schema steps; entry `n` upgrades version `n` to `n + 1`
const MIGRATIONS: &[(&str, &str)] = &[(
    "key-value store",
    "CREATE TABLE IF NOT EXISTS kv_store (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );",
)];

pub(crate) fn get_current_version(conn: &Connection) -> Result<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// Bring the schema up to [`latest_version`]
#[instrument(skip(conn))]
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let current = get_current_version(conn)?;
    for (version, (description, sql)) in (1u32..).zip(MIGRATIONS).skip(current as usize) {
        info!(version, description, "Applying migration");
        conn.execute_batch(sql)?;
        conn.pragma_update(None, "user_version", version)?;
    }
    Ok(())
}

pub fn latest_version() -> u32 {
    MIGRATIONS.len() as u32
}
