//! Bulk deletion of all sheet data.
//!
//! A wipe must finish even when some files are held open, either by another
//! process or by a connection of our own that is still in flight. Every
//! removal is best-effort:
//!
//! 1. Wait for open sheet connections to close, then pause so the OS can
//!    drop its locks.
//! 2. Per sheet, remove `words.db-wal`, `words.db-shm`, then `words.db`.
//! 3. Remove whatever else is left in the sheet directory, then the
//!    directory itself.
//! 4. Remove the index side-file.
//!
//! A failed removal is retried once after a short delay and then handed to
//! the [`DeferredDeleter`]. Nothing in here returns an error.

use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::{DB_FILE_NAME, StoreConfig};
use crate::storage::deferred::DeferredDeleter;
use crate::storage::sheet_store::OpenHandles;

/// Outcome of removing a single path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The path was removed.
    Removed,
    /// The path did not exist.
    Missing,
    /// Removal failed and the path was scheduled for later.
    Deferred,
    /// Removal failed and could not be deferred.
    Failed,
}

/// Summary of a wipe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeletionReport {
    /// Files removed.
    pub removed_files: usize,
    /// Sheet directories removed.
    pub removed_dirs: usize,
    /// Paths scheduled for deferred deletion.
    pub deferred: Vec<PathBuf>,
    /// Paths that could neither be removed nor deferred.
    pub failed: Vec<PathBuf>,
    /// Whether the index side-file is gone.
    pub index_removed: bool,
}

impl DeletionReport {
    /// True if nothing was left behind.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.deferred.is_empty() && self.failed.is_empty()
    }

    fn record(&mut self, path: &Path, outcome: RemoveOutcome, is_dir: bool) {
        match outcome {
            RemoveOutcome::Removed if is_dir => self.removed_dirs += 1,
            RemoveOutcome::Removed => self.removed_files += 1,
            RemoveOutcome::Missing => {}
            RemoveOutcome::Deferred => self.deferred.push(path.to_path_buf()),
            RemoveOutcome::Failed => self.failed.push(path.to_path_buf()),
        }
    }
}

/// Removes every sheet and the index under a storage root.
#[derive(Debug)]
pub struct DeletionManager {
    root: PathBuf,
    index_path: PathBuf,
    release_settle: Duration,
    retry_delay: Duration,
    handles: OpenHandles,
    deferred: Arc<dyn DeferredDeleter>,
}

impl DeletionManager {
    /// Create a deletion manager for the root described by `config`.
    #[must_use]
    pub fn new(
        config: &StoreConfig,
        handles: OpenHandles,
        deferred: Arc<dyn DeferredDeleter>,
    ) -> Self {
        Self {
            root: config.root.clone(),
            index_path: config.index_path(),
            release_settle: config.release_settle,
            retry_delay: config.retry_delay,
            handles,
            deferred,
        }
    }

    /// Remove all sheet data and the index side-file.
    pub fn delete_all(&self) -> DeletionReport {
        let mut report = DeletionReport::default();

        self.release_handles();

        match fs::read_dir(&self.root) {
            Ok(entries) => {
                for entry in entries.flatten() {
                    let is_dir = entry.file_type().is_ok_and(|t| t.is_dir());
                    if is_dir {
                        self.clear_sheet_dir(&entry.path(), &mut report);
                    }
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(root = %self.root.display(), error = %e, "Failed to enumerate storage root");
            }
        }

        let outcome = self.remove_file(&self.index_path);
        report.index_removed = matches!(outcome, RemoveOutcome::Removed | RemoveOutcome::Missing);
        report.record(&self.index_path, outcome, false);

        if report.is_complete() {
            info!(
                files = report.removed_files,
                dirs = report.removed_dirs,
                "Deleted all sheets"
            );
        } else {
            warn!(
                deferred = report.deferred.len(),
                failed = report.failed.len(),
                "Deleted all sheets; some paths were left behind"
            );
        }
        report
    }

    fn release_handles(&self) {
        if !self.handles.wait_released(self.release_settle) {
            warn!(
                open = self.handles.open(),
                "Sheet connections still open; deleting anyway"
            );
        }
        if !self.release_settle.is_zero() {
            std::thread::sleep(self.release_settle);
        }
    }

    fn clear_sheet_dir(&self, dir: &Path, report: &mut DeletionReport) {
        let db_path = dir.join(DB_FILE_NAME);
        // Companions first so a closing connection cannot recreate them.
        let database_files = [
            companion(&db_path, "-wal"),
            companion(&db_path, "-shm"),
            db_path,
        ];
        for path in &database_files {
            let outcome = self.remove_file(path);
            report.record(path, outcome, false);
        }

        // Database files that survived were already retried and recorded.
        let leftovers: Vec<PathBuf> = WalkDir::new(dir)
            .min_depth(1)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(walkdir::DirEntry::into_path)
            .filter(|path| !database_files.contains(path))
            .collect();
        for path in leftovers {
            let outcome = self.remove_file(&path);
            report.record(&path, outcome, false);
        }

        let outcome = self.remove_dir(dir);
        report.record(dir, outcome, true);
    }

    /// Remove one file with attribute reset, one retry, and deferral.
    pub fn remove_file(&self, path: &Path) -> RemoveOutcome {
        if fs::symlink_metadata(path).is_err() {
            return RemoveOutcome::Missing;
        }
        clear_readonly(path);
        self.remove_with_retry(path, |p| fs::remove_file(p))
    }

    fn remove_dir(&self, dir: &Path) -> RemoveOutcome {
        self.remove_with_retry(dir, |p| fs::remove_dir_all(p))
    }

    fn remove_with_retry(&self, path: &Path, remove: impl Fn(&Path) -> io::Result<()>) -> RemoveOutcome {
        let first = match remove(path) {
            Ok(()) => return RemoveOutcome::Removed,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return RemoveOutcome::Missing,
            Err(e) => e,
        };
        debug!(path = %path.display(), error = %first, "Removal failed; retrying");

        if !self.retry_delay.is_zero() {
            std::thread::sleep(self.retry_delay);
        }
        let error = match remove(path) {
            Ok(()) => return RemoveOutcome::Removed,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return RemoveOutcome::Missing,
            Err(e) => e,
        };

        if !self.deferred.is_supported() {
            warn!(path = %path.display(), error = %error, "Failed to remove; deferred deletion unavailable");
            return RemoveOutcome::Failed;
        }
        match self.deferred.schedule(path) {
            Ok(()) => {
                warn!(path = %path.display(), error = %error, "Failed to remove; scheduled for deferred deletion");
                RemoveOutcome::Deferred
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to schedule deferred deletion");
                RemoveOutcome::Failed
            }
        }
    }
}

/// `words.db` + `-wal` → `words.db-wal`.
fn companion(db_path: &Path, suffix: &str) -> PathBuf {
    let mut name = db_path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Best-effort reset of the attributes that block deletion.
#[cfg(windows)]
fn clear_readonly(path: &Path) {
    if let Ok(meta) = fs::metadata(path) {
        let mut perms = meta.permissions();
        if perms.readonly() {
            #[allow(clippy::permissions_set_readonly_false)]
            perms.set_readonly(false);
            let _ = fs::set_permissions(path, perms);
        }
    }
}

/// Best-effort reset of the attributes that block deletion.
#[cfg(unix)]
fn clear_readonly(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    if let Ok(meta) = fs::symlink_metadata(path) {
        if meta.is_file() && meta.permissions().mode() & 0o200 == 0 {
            let mut perms = meta.permissions();
            perms.set_mode(perms.mode() | 0o200);
            let _ = fs::set_permissions(path, perms);
        }
    }
}

#[cfg(not(any(unix, windows)))]
fn clear_readonly(_path: &Path) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::deferred::{NoopDeferredDeleter, PendingDeletions};
    use tempfile::TempDir;

    fn manager(root: &Path, deferred: Arc<dyn DeferredDeleter>) -> DeletionManager {
        DeletionManager::new(
            &StoreConfig::without_delays(root),
            OpenHandles::default(),
            deferred,
        )
    }

    fn make_sheet(root: &Path, name: &str) -> PathBuf {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("words.db"), b"db").unwrap();
        fs::write(dir.join("words.db-wal"), b"wal").unwrap();
        fs::write(dir.join("words.db-shm"), b"shm").unwrap();
        dir
    }

    #[test]
    fn test_removes_sheets_and_index() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let n5 = make_sheet(root, "N5");
        let n4 = make_sheet(root, "N4");
        fs::write(n4.join("notes.txt"), b"extra").unwrap();
        fs::write(root.join("sheets_index.json"), b"[]").unwrap();

        let report = manager(root, Arc::new(NoopDeferredDeleter)).delete_all();

        assert!(report.is_complete());
        assert!(report.index_removed);
        assert_eq!(report.removed_dirs, 2);
        assert_eq!(report.removed_files, 8);
        assert!(!n5.exists());
        assert!(!n4.exists());
        assert!(!root.join("sheets_index.json").exists());
    }

    #[test]
    fn test_leaves_unrelated_root_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        make_sheet(root, "N5");
        fs::write(root.join(".pending_deletions.json"), b"[]").unwrap();

        manager(root, Arc::new(NoopDeferredDeleter)).delete_all();

        assert!(root.join(".pending_deletions.json").exists());
    }

    #[test]
    fn test_unremovable_file_is_deferred() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let dir = root.join("N5");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("words.db"), b"db").unwrap();
        // A directory where a file is expected cannot be removed as a file,
        // whatever the caller's privileges.
        fs::create_dir_all(dir.join("words.db-wal").join("inner")).unwrap();
        fs::write(root.join("sheets_index.json"), b"[]").unwrap();

        let pending = Arc::new(PendingDeletions::load(root.join(".pending_deletions.json")));
        let report = manager(root, pending.clone()).delete_all();

        assert_eq!(report.deferred, vec![dir.join("words.db-wal")]);
        assert!(report.index_removed);
        assert!(!root.join("sheets_index.json").exists());
        assert!(pending.is_pending(&dir.join("words.db-wal")));
    }

    #[test]
    fn test_unremovable_file_without_deferral_is_failed() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let dir = root.join("N5");
        fs::create_dir_all(dir.join("words.db-shm")).unwrap();

        let report = manager(root, Arc::new(NoopDeferredDeleter)).delete_all();

        assert_eq!(report.failed, vec![dir.join("words.db-shm")]);
        assert!(!report.is_complete());
    }

    #[test]
    fn test_missing_root_is_not_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("never-created");

        let report = manager(&root, Arc::new(NoopDeferredDeleter)).delete_all();

        assert!(report.is_complete());
        assert!(report.index_removed);
        assert_eq!(report.removed_dirs, 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_read_only_file_is_removed() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let dir = make_sheet(root, "N5");
        fs::set_permissions(dir.join("words.db"), fs::Permissions::from_mode(0o444)).unwrap();

        let report = manager(root, Arc::new(NoopDeferredDeleter)).delete_all();

        assert!(report.is_complete());
        assert!(!dir.exists());
    }

    /// Make `dir` read-only. Returns `false` if the current user can still
    /// write into it (root ignores directory permissions).
    #[cfg(unix)]
    fn lock_dir(dir: &Path) -> bool {
        use std::os::unix::fs::PermissionsExt;

        fs::set_permissions(dir, fs::Permissions::from_mode(0o555)).unwrap();
        let check = dir.join(".write-check");
        if fs::write(&check, b"x").is_ok() {
            fs::remove_file(&check).unwrap();
            unlock_dir(dir);
            return false;
        }
        true
    }

    #[cfg(unix)]
    fn unlock_dir(dir: &Path) {
        use std::os::unix::fs::PermissionsExt;

        fs::set_permissions(dir, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_locked_sheet_dir_is_deferred_once_per_path() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let dir = make_sheet(root, "N5");
        fs::write(dir.join("notes.txt"), b"extra").unwrap();
        if !lock_dir(&dir) {
            return;
        }

        let pending = Arc::new(PendingDeletions::load(root.join(".pending_deletions.json")));
        let report = manager(root, pending.clone()).delete_all();
        unlock_dir(&dir);

        assert!(dir.is_dir());
        assert_eq!(report.deferred.len(), 5);
        for path in [
            dir.join("words.db-wal"),
            dir.join("words.db-shm"),
            dir.join("words.db"),
            dir.join("notes.txt"),
            dir.clone(),
        ] {
            let count = report.deferred.iter().filter(|p| **p == path).count();
            assert_eq!(count, 1, "{}", path.display());
        }
        assert!(pending.is_pending(&dir));
        assert_eq!(report.removed_dirs, 0);
    }

    #[test]
    fn test_companion_paths() {
        let db = Path::new("/w/N5/words.db");
        assert_eq!(companion(db, "-wal"), PathBuf::from("/w/N5/words.db-wal"));
        assert_eq!(companion(db, "-shm"), PathBuf::from("/w/N5/words.db-shm"));
    }
}
