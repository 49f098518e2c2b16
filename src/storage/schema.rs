//! Sheet database schema.
//!
//! Every sheet directory holds one SQLite file with a single `Words` table.
//! The column names match databases written by earlier versions of the
//! application, so existing sheets open without migration.

use rusqlite::{Connection, Result};

/// Current schema version, recorded in `PRAGMA user_version`.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// The complete SQL schema for a sheet database.
pub const SCHEMA_SQL: &str = r"
CREATE TABLE IF NOT EXISTS Words (
    Id INTEGER PRIMARY KEY,
    Japanese TEXT NOT NULL,
    Chinese TEXT NOT NULL,
    PartOfSpeech TEXT DEFAULT ''
);
";

/// Apply the schema to a sheet database.
///
/// Idempotent; safe to call every time a sheet is written.
///
/// # Errors
///
/// Returns an error if the SQL execution fails or pragmas cannot be set.
pub fn apply_schema(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;

    conn.execute_batch(SCHEMA_SQL)?;

    let version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if version < CURRENT_SCHEMA_VERSION {
        conn.pragma_update(None, "user_version", CURRENT_SCHEMA_VERSION)?;
    }

    Ok(())
}
