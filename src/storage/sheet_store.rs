//! Per-sheet SQLite storage.
//!
//! Each sheet lives in its own `words.db`. Connections are opened for a
//! single call and closed before it returns, so a wipe only has to wait for
//! calls that are in flight. Open connections are counted by
//! [`OpenHandles`] for exactly that purpose.

use rusqlite::{Connection, OpenFlags, OptionalExtension};
use std::fs;
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::error::Result;
use crate::model::WordEntry;
use crate::model::sheet::db_path_in;
use crate::storage::schema::apply_schema;

/// Shared counter of open sheet connections.
#[derive(Debug, Clone, Default)]
pub struct OpenHandles {
    count: Arc<AtomicUsize>,
}

impl OpenHandles {
    /// Number of connections currently open.
    #[must_use]
    pub fn open(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    /// Wait until every connection is closed or `limit` elapses.
    ///
    /// Returns `true` if all handles were released in time.
    pub fn wait_released(&self, limit: Duration) -> bool {
        let deadline = Instant::now() + limit;
        loop {
            if self.open() == 0 {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    fn register(&self) -> HandleGuard {
        self.count.fetch_add(1, Ordering::AcqRel);
        HandleGuard {
            count: Arc::clone(&self.count),
        }
    }
}

#[derive(Debug)]
struct HandleGuard {
    count: Arc<AtomicUsize>,
}

impl Drop for HandleGuard {
    fn drop(&mut self) {
        self.count.fetch_sub(1, Ordering::AcqRel);
    }
}

/// A sheet connection that is counted while it is alive.
#[derive(Debug)]
pub struct TrackedConnection {
    // Field order matters: the connection closes before the guard releases.
    conn: Connection,
    _guard: HandleGuard,
}

impl Deref for TrackedConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.conn
    }
}

/// SQLite-backed store for sheet contents.
#[derive(Debug, Clone)]
pub struct SheetStore {
    busy_timeout: Duration,
    handles: OpenHandles,
}

impl SheetStore {
    /// Create a store applying `busy_timeout` to every connection.
    #[must_use]
    pub fn new(busy_timeout: Duration) -> Self {
        Self {
            busy_timeout,
            handles: OpenHandles::default(),
        }
    }

    /// The open-connection counter shared with the deletion path.
    #[must_use]
    pub fn handles(&self) -> &OpenHandles {
        &self.handles
    }

    /// Whether `folder` holds a sheet database.
    #[must_use]
    pub fn has_database(folder: &Path) -> bool {
        db_path_in(folder).is_file()
    }

    /// Open the sheet database in `folder`.
    ///
    /// With `create` unset a missing database is an error rather than a new
    /// empty file.
    fn open(&self, folder: &Path, create: bool) -> Result<TrackedConnection> {
        let path = db_path_in(folder);
        let mut flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        if create {
            flags |= OpenFlags::SQLITE_OPEN_CREATE;
        }

        let conn = Connection::open_with_flags(&path, flags)?;
        conn.busy_timeout(self.busy_timeout)?;
        Ok(TrackedConnection {
            conn,
            _guard: self.handles.register(),
        })
    }

    /// Replace every row of the sheet in `folder` with `entries`.
    ///
    /// Creates the directory and database if needed. The delete and inserts
    /// run in one transaction; if it fails SQLite rolls it back, nothing
    /// beyond that is attempted.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or any SQL step
    /// fails.
    pub fn replace_all(&self, folder: &Path, entries: &[WordEntry]) -> Result<usize> {
        fs::create_dir_all(folder)?;

        let mut conn = self.open(folder, true)?;
        apply_schema(&conn)?;

        let tx = conn.conn.transaction()?;
        let removed = tx.execute("DELETE FROM Words", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO Words (Japanese, Chinese, PartOfSpeech) VALUES (?1, ?2, ?3)",
            )?;
            for entry in entries {
                stmt.execute((&entry.japanese, &entry.chinese, &entry.part_of_speech))?;
            }
        }
        tx.commit()?;

        debug!(
            folder = %folder.display(),
            removed,
            inserted = entries.len(),
            "Replaced sheet contents"
        );
        Ok(entries.len())
    }

    /// Read every entry of the sheet in `folder`, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database is missing or unreadable.
    pub fn read_all(&self, folder: &Path) -> Result<Vec<WordEntry>> {
        let conn = self.open(folder, false)?;
        let mut stmt =
            conn.prepare("SELECT Japanese, Chinese, PartOfSpeech FROM Words ORDER BY Id")?;
        let rows = stmt.query_map([], map_entry)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Count the rows of the sheet in `folder`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database is missing or unreadable.
    pub fn row_count(&self, folder: &Path) -> Result<u64> {
        let conn = self.open(folder, false)?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM Words", [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// First entry of the sheet in `folder`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database is missing or unreadable.
    pub fn first_entry(&self, folder: &Path) -> Result<Option<WordEntry>> {
        let conn = self.open(folder, false)?;
        let entry = conn
            .query_row(
                "SELECT Japanese, Chinese, PartOfSpeech FROM Words ORDER BY Id LIMIT 1",
                [],
                map_entry,
            )
            .optional()?;
        Ok(entry)
    }
}

fn map_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<WordEntry> {
    Ok(WordEntry {
        japanese: row.get(0)?,
        chinese: row.get(1)?,
        part_of_speech: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
    })
}
