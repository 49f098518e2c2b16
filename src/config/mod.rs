//! Configuration management.
//!
//! This module resolves where sheet data lives on disk and carries the
//! tunables of the storage engine.
//!
//! # Layout
//!
//! All data lives under a single storage root named `WordTables`:
//! - **Sheets**: `WordTables/<sanitized-name>/words.db`
//! - **Index**: `WordTables/sheets_index.json`
//! - **Deferred deletions**: `WordTables/.pending_deletions.json`

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application directory name under the platform data directory.
pub const APP_DIR_NAME: &str = "日语单词斩";

/// Name of the storage root directory.
pub const STORAGE_DIR_NAME: &str = "WordTables";

/// Database file inside every sheet directory.
pub const DB_FILE_NAME: &str = "words.db";

/// Index side-file, a sibling of the sheet directories.
pub const INDEX_FILE_NAME: &str = "sheets_index.json";

/// Manifest of paths waiting for deferred deletion.
pub const PENDING_FILE_NAME: &str = ".pending_deletions.json";

/// Maximum length of a sanitized sheet directory name, in characters.
pub const MAX_NAME_LEN: usize = 50;

/// Tunables for a storage root.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// The `WordTables` directory.
    pub root: PathBuf,
    /// Maximum sanitized directory name length.
    pub max_name_len: usize,
    /// SQLite busy timeout applied to every connection.
    pub busy_timeout: Duration,
    /// Pause before a wipe so the OS can release file locks.
    pub release_settle: Duration,
    /// Delay before the single retry of a failed file removal.
    pub retry_delay: Duration,
}

impl StoreConfig {
    /// Default configuration for a storage root.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_name_len: MAX_NAME_LEN,
            busy_timeout: Duration::from_secs(5),
            release_settle: Duration::from_secs(2),
            retry_delay: Duration::from_millis(100),
        }
    }

    /// Configuration with every delay zeroed, for tests.
    #[must_use]
    pub fn without_delays(root: impl Into<PathBuf>) -> Self {
        Self {
            release_settle: Duration::ZERO,
            retry_delay: Duration::ZERO,
            ..Self::new(root)
        }
    }

    /// Path of the index side-file.
    #[must_use]
    pub fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE_NAME)
    }

    /// Path of the deferred deletion manifest.
    #[must_use]
    pub fn pending_path(&self) -> PathBuf {
        self.root.join(PENDING_FILE_NAME)
    }
}

/// Get the application data directory (`<data dir>/日语单词斩`).
#[must_use]
pub fn app_data_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.data_dir().join(APP_DIR_NAME))
}

/// Check if test mode is enabled.
///
/// Test mode is enabled by setting `WT_TEST_DIR=1` (or any non-empty value).
/// This redirects all storage to an isolated test root.
#[must_use]
pub fn is_test_mode() -> bool {
    std::env::var("WT_TEST_DIR").is_ok_and(|v| is_truthy(&v))
}

fn is_truthy(value: &str) -> bool {
    !value.is_empty() && value != "0" && !value.eq_ignore_ascii_case("false")
}

/// Get the test storage root.
#[must_use]
pub fn test_storage_root() -> Option<PathBuf> {
    app_data_dir().map(|dir| dir.join("test").join(STORAGE_DIR_NAME))
}

/// Resolve the storage root.
///
/// Priority:
/// 1. If `explicit_path` is provided (`--root` / `WT_ROOT`), use it directly
/// 2. `WT_TEST_DIR` environment variable → test storage root
/// 3. `WORDTABLES_HOME` environment variable → `$WORDTABLES_HOME/WordTables`
/// 4. Platform data directory: `<data dir>/日语单词斩/WordTables`
///
/// Returns `None` if no location can be determined.
#[must_use]
pub fn resolve_storage_root(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    if is_test_mode() {
        return test_storage_root();
    }

    if let Ok(home) = std::env::var("WORDTABLES_HOME") {
        if !home.trim().is_empty() {
            return Some(PathBuf::from(home).join(STORAGE_DIR_NAME));
        }
    }

    app_data_dir().map(|dir| dir.join(STORAGE_DIR_NAME))
}
