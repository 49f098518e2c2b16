//! In-memory cache of the sheet index.
//!
//! The cache is **Warm** while it holds a copy of the index together with
//! the side-file's modification time at the moment the copy was taken, and
//! **Cold** otherwise. A warm cache answers without touching the databases
//! for as long as the side-file's modification time is unchanged; any
//! external write to the side-file sends the next read back to disk.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};

use crate::index::codec::decode;
use crate::index::scanner::Scanner;
use crate::model::SheetRecord;
use crate::storage::file::modified_time;
use crate::storage::sheet_store::SheetStore;

/// Why the side-file could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexMiss {
    /// The side-file does not exist.
    Absent,
    /// The side-file could not be read or decoded.
    Corrupt(String),
    /// A record points at a sheet whose database is gone.
    Stale { missing: PathBuf },
}

impl fmt::Display for IndexMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("index file absent"),
            Self::Corrupt(reason) => write!(f, "index file unreadable: {reason}"),
            Self::Stale { missing } => write!(f, "index refers to missing {}", missing.display()),
        }
    }
}

#[derive(Debug)]
enum CacheState {
    Cold,
    Warm {
        sheets: Vec<SheetRecord>,
        token: SystemTime,
    },
}

/// Cached view of the sheet index.
#[derive(Debug)]
pub struct IndexCache {
    index_path: PathBuf,
    state: CacheState,
}

impl IndexCache {
    /// Create a cold cache for the side-file at `index_path`.
    #[must_use]
    pub fn new(index_path: impl Into<PathBuf>) -> Self {
        Self {
            index_path: index_path.into(),
            state: CacheState::Cold,
        }
    }

    /// Whether the cache currently holds an index.
    #[must_use]
    pub fn is_warm(&self) -> bool {
        matches!(self.state, CacheState::Warm { .. })
    }

    /// Drop the cached index.
    pub fn invalidate(&mut self) {
        self.state = CacheState::Cold;
    }

    /// Current sheet list.
    ///
    /// Served from memory while the side-file is unchanged, otherwise from
    /// the side-file, otherwise from a full rescan.
    pub fn get(&mut self, scanner: &Scanner) -> Vec<SheetRecord> {
        if let Some(sheets) = self.fresh_copy() {
            debug!(count = sheets.len(), "Sheet index cache hit");
            return sheets;
        }

        match load(&self.index_path) {
            Ok((sheets, token)) => {
                debug!(count = sheets.len(), "Loaded sheet index from disk");
                self.state = CacheState::Warm {
                    sheets: sheets.clone(),
                    token,
                };
                sheets
            }
            Err(miss) => {
                debug!(reason = %miss, "Sheet index unusable; rescanning");
                self.rebuild(scanner)
            }
        }
    }

    /// Rescan unconditionally and warm the cache with the result.
    pub fn refresh(&mut self, scanner: &Scanner) -> Vec<SheetRecord> {
        self.invalidate();
        self.rebuild(scanner)
    }

    fn fresh_copy(&self) -> Option<Vec<SheetRecord>> {
        match &self.state {
            CacheState::Warm { sheets, token } if modified_time(&self.index_path) == Some(*token) => {
                Some(sheets.clone())
            }
            _ => None,
        }
    }

    fn rebuild(&mut self, scanner: &Scanner) -> Vec<SheetRecord> {
        let sheets = scanner.scan();
        let token = match scanner.persist(&sheets) {
            Ok(()) => modified_time(&self.index_path),
            Err(e) => {
                warn!(index = %self.index_path.display(), error = %e, "Failed to write sheet index");
                None
            }
        };

        self.state = match token {
            Some(token) => CacheState::Warm {
                sheets: sheets.clone(),
                token,
            },
            None => CacheState::Cold,
        };
        sheets
    }
}

/// Read, decode, and validate the side-file.
///
/// The token is taken before reading, so a write racing with the read makes
/// the copy look stale rather than fresh.
fn load(index_path: &Path) -> Result<(Vec<SheetRecord>, SystemTime), IndexMiss> {
    let token = modified_time(index_path).ok_or(IndexMiss::Absent)?;
    let bytes = fs::read(index_path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => IndexMiss::Absent,
        _ => IndexMiss::Corrupt(e.to_string()),
    })?;
    let sheets = decode(&bytes).map_err(|e| IndexMiss::Corrupt(e.to_string()))?;
    validate(&sheets)?;
    Ok((sheets, token))
}

/// All or nothing: one missing database discards the whole index.
fn validate(sheets: &[SheetRecord]) -> Result<(), IndexMiss> {
    match sheets
        .iter()
        .find(|sheet| !SheetStore::has_database(&sheet.folder_path))
    {
        Some(sheet) => Err(IndexMiss::Stale {
            missing: sheet.db_path(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::model::WordEntry;
    use crate::storage::deferred::NoopDeferredDeleter;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    struct Fixture {
        _temp_dir: TempDir,
        root: PathBuf,
        store: SheetStore,
        scanner: Scanner,
        cache: IndexCache,
    }

    fn fixture() -> Fixture {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_path_buf();
        let config = StoreConfig::without_delays(&root);
        let store = SheetStore::new(config.busy_timeout);
        let scanner = Scanner::new(&config, store.clone(), Arc::new(NoopDeferredDeleter));
        let cache = IndexCache::new(config.index_path());
        Fixture {
            _temp_dir: temp_dir,
            root,
            store,
            scanner,
            cache,
        }
    }

    fn words(n: usize) -> Vec<WordEntry> {
        (0..n).map(|i| WordEntry::new(format!("w{i}"), format!("c{i}"), "")).collect()
    }

    /// Rewrite the side-file with a modification time that cannot collide
    /// with the cached token.
    fn overwrite_index(path: &Path, json: &str) {
        fs::write(path, json).unwrap();
        let file = fs::File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() + Duration::from_secs(60)).unwrap();
    }

    #[test]
    fn test_cold_get_scans_and_warms() {
        let mut f = fixture();
        f.store.replace_all(&f.root.join("N5"), &words(2)).unwrap();

        let sheets = f.cache.get(&f.scanner);

        assert_eq!(sheets.len(), 1);
        assert!(f.cache.is_warm());
        assert!(f.scanner.index_path().exists());
    }

    #[test]
    fn test_warm_cache_ignores_database_changes() {
        let mut f = fixture();
        f.store.replace_all(&f.root.join("N5"), &words(2)).unwrap();
        f.cache.get(&f.scanner);

        // The cache is keyed on the side-file only.
        f.store.replace_all(&f.root.join("N5"), &words(5)).unwrap();

        assert_eq!(f.cache.get(&f.scanner)[0].word_count, 2);
    }

    #[test]
    fn test_external_index_change_invalidates() {
        let mut f = fixture();
        f.store.replace_all(&f.root.join("N5"), &words(2)).unwrap();
        f.cache.get(&f.scanner);

        let folder = f.root.join("N5");
        let json = serde_json::to_string(&vec![SheetRecord {
            name: "Renamed".to_string(),
            word_count: 99,
            folder_path: folder,
        }])
        .unwrap();
        overwrite_index(f.scanner.index_path(), &json);

        let sheets = f.cache.get(&f.scanner);
        assert_eq!(sheets[0].name, "Renamed");
        assert_eq!(sheets[0].word_count, 99);
    }

    #[test]
    fn test_corrupt_index_triggers_rescan() {
        let mut f = fixture();
        f.store.replace_all(&f.root.join("N5"), &words(3)).unwrap();
        overwrite_index(f.scanner.index_path(), "[{\"Name\":");

        let sheets = f.cache.get(&f.scanner);

        assert_eq!(sheets.len(), 1);
        assert_eq!(sheets[0].word_count, 3);
        assert_eq!(load(f.scanner.index_path()).unwrap().0, sheets);
    }

    #[test]
    fn test_stale_record_discards_whole_index() {
        let mut f = fixture();
        f.store.replace_all(&f.root.join("A"), &words(1)).unwrap();
        let json = serde_json::to_string(&vec![
            SheetRecord {
                name: "A".to_string(),
                word_count: 1,
                folder_path: f.root.join("A"),
            },
            SheetRecord {
                name: "Gone".to_string(),
                word_count: 7,
                folder_path: f.root.join("Gone"),
            },
        ])
        .unwrap();
        overwrite_index(f.scanner.index_path(), &json);

        assert!(matches!(
            load(f.scanner.index_path()),
            Err(IndexMiss::Stale { .. })
        ));
        let names: Vec<_> = f.cache.get(&f.scanner).into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["A"]);
    }

    #[test]
    fn test_invalidate_and_refresh() {
        let mut f = fixture();
        f.store.replace_all(&f.root.join("N5"), &words(2)).unwrap();
        f.cache.get(&f.scanner);

        f.cache.invalidate();
        assert!(!f.cache.is_warm());

        f.store.replace_all(&f.root.join("N5"), &words(4)).unwrap();
        let sheets = f.cache.refresh(&f.scanner);
        assert_eq!(sheets[0].word_count, 4);
        assert!(f.cache.is_warm());
    }

    #[test]
    fn test_absent_index_miss() {
        let f = fixture();
        assert_eq!(load(f.scanner.index_path()), Err(IndexMiss::Absent));
    }
}
