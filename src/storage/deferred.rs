//! Deferred deletion.
//!
//! When a file or directory cannot be removed during a wipe (another
//! process holds it open), it is handed to a [`DeferredDeleter`] to be
//! removed later. [`PendingDeletions`] records such paths in a JSON manifest
//! next to the sheet directories and retries them the next time a
//! repository is opened. [`NoopDeferredDeleter`] is for callers that do not
//! want anything left behind on disk.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

use crate::storage::file::atomic_write;

/// Capability to remove paths at a later time.
pub trait DeferredDeleter: Send + Sync + std::fmt::Debug {
    /// Whether scheduling actually defers anything.
    fn is_supported(&self) -> bool;

    /// Schedule `path` for removal later.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be recorded.
    fn schedule(&self, path: &Path) -> io::Result<()>;

    /// Whether `path` (or one of its ancestors) is waiting for removal.
    fn is_pending(&self, _path: &Path) -> bool {
        false
    }

    /// Drop pending entries at or below `prefix`.
    fn forget(&self, _prefix: &Path) {}

    /// Retry every pending removal. Returns how many paths were removed.
    fn sweep(&self) -> usize {
        0
    }
}

/// Deferred deleter that never defers.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDeferredDeleter;

impl DeferredDeleter for NoopDeferredDeleter {
    fn is_supported(&self) -> bool {
        false
    }

    fn schedule(&self, path: &Path) -> io::Result<()> {
        debug!(path = %path.display(), "Deferred deletion unsupported; leaving path in place");
        Ok(())
    }
}

/// Manifest-backed deferred deleter.
///
/// Pending paths are removed by [`DeferredDeleter::sweep`], which the
/// repository runs when it is opened.
#[derive(Debug)]
pub struct PendingDeletions {
    manifest: PathBuf,
    paths: Mutex<BTreeSet<PathBuf>>,
}

impl PendingDeletions {
    /// Load the manifest at `manifest`, starting empty if it is absent or
    /// unreadable.
    #[must_use]
    pub fn load(manifest: impl Into<PathBuf>) -> Self {
        let manifest = manifest.into();
        let paths = fs::read(&manifest)
            .ok()
            .and_then(|bytes| match serde_json::from_slice::<BTreeSet<PathBuf>>(&bytes) {
                Ok(paths) => Some(paths),
                Err(e) => {
                    warn!(manifest = %manifest.display(), error = %e, "Ignoring unreadable deferred deletion manifest");
                    None
                }
            })
            .unwrap_or_default();

        Self {
            manifest,
            paths: Mutex::new(paths),
        }
    }

    /// Snapshot of the pending paths.
    #[must_use]
    pub fn pending(&self) -> Vec<PathBuf> {
        self.lock().iter().cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeSet<PathBuf>> {
        // A panic while holding the lock leaves the set itself intact.
        self.paths
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn persist(&self, paths: &BTreeSet<PathBuf>) -> io::Result<()> {
        if paths.is_empty() {
            return match fs::remove_file(&self.manifest) {
                Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
                _ => Ok(()),
            };
        }
        let json = serde_json::to_string_pretty(paths).map_err(io::Error::other)?;
        atomic_write(&self.manifest, json.as_bytes())
    }
}

impl DeferredDeleter for PendingDeletions {
    fn is_supported(&self) -> bool {
        true
    }

    fn schedule(&self, path: &Path) -> io::Result<()> {
        let mut paths = self.lock();
        if paths.insert(path.to_path_buf()) {
            self.persist(&paths)?;
            debug!(path = %path.display(), "Scheduled deferred deletion");
        }
        Ok(())
    }

    fn is_pending(&self, path: &Path) -> bool {
        self.lock()
            .iter()
            .any(|pending| path.starts_with(pending))
    }

    fn forget(&self, prefix: &Path) {
        let mut paths = self.lock();
        let before = paths.len();
        paths.retain(|pending| !pending.starts_with(prefix));
        if paths.len() != before {
            if let Err(e) = self.persist(&paths) {
                warn!(error = %e, "Failed to update deferred deletion manifest");
            }
        }
    }

    fn sweep(&self) -> usize {
        let mut paths = self.lock();
        if paths.is_empty() {
            return 0;
        }

        let before = paths.len();
        paths.retain(|path| match remove_path(path) {
            Ok(()) => false,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Deferred deletion still blocked");
                true
            }
        });
        let removed = before - paths.len();

        if let Err(e) = self.persist(&paths) {
            warn!(error = %e, "Failed to update deferred deletion manifest");
        }
        removed
    }
}

/// Remove a file or directory tree; a path that is already gone counts as
/// removed.
fn remove_path(path: &Path) -> io::Result<()> {
    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match result {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
