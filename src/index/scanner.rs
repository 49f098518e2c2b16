//! Full rebuild of the sheet index from disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::error::Result;
use crate::index::codec::write_index;
use crate::model::SheetRecord;
use crate::storage::deferred::DeferredDeleter;
use crate::storage::order::sort_sheets;
use crate::storage::sanitize::display_name;
use crate::storage::sheet_store::SheetStore;

/// Walks the storage root and rebuilds the index from the sheet databases.
#[derive(Debug, Clone)]
pub struct Scanner {
    root: PathBuf,
    index_path: PathBuf,
    store: SheetStore,
    deferred: Arc<dyn DeferredDeleter>,
}

impl Scanner {
    /// Create a scanner over the root described by `config`.
    #[must_use]
    pub fn new(config: &StoreConfig, store: SheetStore, deferred: Arc<dyn DeferredDeleter>) -> Self {
        Self {
            root: config.root.clone(),
            index_path: config.index_path(),
            store,
            deferred,
        }
    }

    /// Path of the index side-file this scanner writes.
    #[must_use]
    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    /// Rebuild the index and write it to the side-file.
    ///
    /// A failure to write the side-file is logged; the scanned records are
    /// returned regardless.
    pub fn rescan(&self) -> Vec<SheetRecord> {
        let sheets = self.scan();
        if let Err(e) = self.persist(&sheets) {
            warn!(index = %self.index_path.display(), error = %e, "Failed to write sheet index");
        }
        sheets
    }

    /// Rebuild the index without touching the side-file.
    ///
    /// Sheets whose database cannot be opened or counted are skipped, as
    /// are directories waiting for deferred deletion.
    pub fn scan(&self) -> Vec<SheetRecord> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(root = %self.root.display(), error = %e, "Failed to read storage root");
                return Vec::new();
            }
        };

        let mut sheets = Vec::new();
        for entry in entries.flatten() {
            if !entry.file_type().is_ok_and(|t| t.is_dir()) {
                continue;
            }
            let folder = entry.path();
            if self.deferred.is_pending(&folder) {
                debug!(folder = %folder.display(), "Skipping sheet pending deletion");
                continue;
            }
            if !SheetStore::has_database(&folder) {
                continue;
            }

            match self.store.row_count(&folder) {
                Ok(word_count) => sheets.push(SheetRecord {
                    name: display_name(&entry.file_name().to_string_lossy()),
                    word_count,
                    folder_path: folder,
                }),
                Err(e) => {
                    warn!(folder = %folder.display(), error = %e, "Skipping unreadable sheet");
                }
            }
        }

        sort_sheets(&mut sheets);
        debug!(count = sheets.len(), "Scanned sheets");
        sheets
    }

    /// Write `sheets` to the index side-file.
    ///
    /// # Errors
    ///
    /// Returns an error if the side-file cannot be written.
    pub fn persist(&self, sheets: &[SheetRecord]) -> Result<()> {
        write_index(&self.index_path, sheets)
    }
}
