//! Repository facade over the sheet storage engine.
//!
//! The repository owns a storage root and everything derived from it: the
//! per-sheet databases, the index side-file, the index cache, and the
//! deferred deletion manifest. It is the only type callers need.
//!
//! Every method may block on disk or SQLite I/O. Interactive callers should
//! go through [`crate::worker::RepositoryHandle`] instead of calling these
//! directly on a UI thread.
//!
//! Callers must not run two repositories over the same root at once; the
//! `&mut self` receivers serialise use of a single instance.

use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::index::{IndexCache, Scanner};
use crate::model::{SheetRecord, WordEntry};
use crate::storage::deferred::{DeferredDeleter, PendingDeletions};
use crate::storage::deletion::{DeletionManager, DeletionReport};
use crate::storage::sanitize::sheet_dir_name;
use crate::storage::sheet_store::SheetStore;

/// One sheet handed over by an importer.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct SheetData {
    /// Display name of the sheet
    #[serde(alias = "sheet")]
    pub name: String,
    /// Entries in sheet order
    pub words: Vec<WordEntry>,
}

/// Result of saving one sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveOutcome {
    /// Display name as given by the caller
    pub name: String,
    /// Directory the sheet was written to
    pub folder_path: PathBuf,
    /// Rows written
    pub word_count: usize,
    /// Whether an existing sheet directory was overwritten
    pub replaced: bool,
    /// A different name this repository last saved into the same directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collided_with: Option<String>,
}

/// Result of importing a batch of sheets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Sheets written to a new directory
    pub created: usize,
    /// Sheets that replaced an existing directory
    pub overwritten: usize,
    /// Names of sheets skipped because they had no entries
    pub skipped_empty: Vec<String>,
    /// Entries written across all sheets
    pub total_words: usize,
    /// Names of sheets that replaced a differently named sheet
    pub collisions: Vec<String>,
}

/// Local sheet storage.
#[derive(Debug)]
pub struct Repository {
    config: StoreConfig,
    store: SheetStore,
    scanner: Scanner,
    cache: IndexCache,
    deletion: DeletionManager,
    deferred: Arc<dyn DeferredDeleter>,
    /// Name each directory was last saved under by this instance.
    saved_names: HashMap<PathBuf, String>,
}

impl Repository {
    /// Open (creating if needed) the storage root in `config`.
    ///
    /// Paths left over from an earlier wipe are retried first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageUnavailable`] if the root cannot be created.
    pub fn open(config: StoreConfig) -> Result<Self> {
        let config = prepare_root(config)?;
        let deferred = Arc::new(PendingDeletions::load(config.pending_path()));
        Ok(Self::assemble(config, deferred))
    }

    /// Open the storage root with a caller-supplied deferred deleter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageUnavailable`] if the root cannot be created.
    pub fn open_with_deferred(
        config: StoreConfig,
        deferred: Arc<dyn DeferredDeleter>,
    ) -> Result<Self> {
        let config = prepare_root(config)?;
        Ok(Self::assemble(config, deferred))
    }

    fn assemble(config: StoreConfig, deferred: Arc<dyn DeferredDeleter>) -> Self {
        let swept = deferred.sweep();
        if swept > 0 {
            info!(count = swept, "Removed paths left over from an earlier wipe");
        }

        let store = SheetStore::new(config.busy_timeout);
        let scanner = Scanner::new(&config, store.clone(), Arc::clone(&deferred));
        let cache = IndexCache::new(config.index_path());
        let deletion = DeletionManager::new(&config, store.handles().clone(), Arc::clone(&deferred));

        Self {
            config,
            store,
            scanner,
            cache,
            deletion,
            deferred,
            saved_names: HashMap::new(),
        }
    }

    /// The storage root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// Directory that holds (or would hold) the sheet called `name`.
    #[must_use]
    pub fn sheet_dir(&self, name: &str) -> Option<PathBuf> {
        sheet_dir_name(name, self.config.max_name_len).map(|dir| self.config.root.join(dir))
    }

    /// Store `entries` as the full contents of sheet `name`.
    ///
    /// Names that sanitize to the same directory share one sheet; the last
    /// save wins. The index is rebuilt before returning, so the next
    /// listing is served from a warm cache.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSheetName`] for names with no usable
    /// characters and [`Error::SaveFailed`] if the sheet cannot be written.
    pub fn save(&mut self, name: &str, entries: &[WordEntry]) -> Result<SaveOutcome> {
        let outcome = self.write_sheet(name, entries);
        self.cache.invalidate();
        let outcome = outcome?;
        self.cache.refresh(&self.scanner);
        Ok(outcome)
    }

    fn write_sheet(&mut self, name: &str, entries: &[WordEntry]) -> Result<SaveOutcome> {
        let folder = self.sheet_dir(name).ok_or_else(|| Error::InvalidSheetName {
            name: name.to_string(),
        })?;
        let replaced = folder.is_dir();
        let collided_with = self
            .saved_names
            .get(&folder)
            .filter(|previous| previous.as_str() != name)
            .cloned();
        if let Some(previous) = &collided_with {
            warn!(
                sheet = name,
                previous = %previous,
                folder = %folder.display(),
                "Sheet name maps to the same directory as another sheet; replacing it"
            );
        } else if replaced {
            info!(sheet = name, folder = %folder.display(), "Overwriting existing sheet");
        }

        // Writing into a directory reclaims it from an earlier wipe.
        self.deferred.forget(&folder);

        let word_count = self
            .store
            .replace_all(&folder, entries)
            .map_err(|e| Error::save_failed(name, e))?;

        debug!(sheet = name, word_count, "Saved sheet");
        self.saved_names.insert(folder.clone(), name.to_string());
        Ok(SaveOutcome {
            name: name.to_string(),
            folder_path: folder,
            word_count,
            replaced,
            collided_with,
        })
    }

    /// Save a batch of sheets in order, skipping sheets with no entries.
    ///
    /// The index is rebuilt once, after the last sheet.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first failed save; sheets saved before it
    /// stay saved.
    pub fn import<I>(&mut self, batch: I) -> Result<ImportSummary>
    where
        I: IntoIterator<Item = SheetData>,
    {
        let mut summary = ImportSummary::default();
        let mut result = Ok(());

        for sheet in batch {
            if sheet.words.is_empty() {
                debug!(sheet = %sheet.name, "Skipping empty sheet");
                summary.skipped_empty.push(sheet.name);
                continue;
            }
            match self.write_sheet(&sheet.name, &sheet.words) {
                Ok(outcome) => {
                    if outcome.replaced {
                        summary.overwritten += 1;
                    } else {
                        summary.created += 1;
                    }
                    summary.total_words += outcome.word_count;
                    if outcome.collided_with.is_some() {
                        summary.collisions.push(outcome.name);
                    }
                }
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }

        self.cache.invalidate();
        if summary.created + summary.overwritten > 0 {
            self.cache.refresh(&self.scanner);
        }
        result.map(|()| summary)
    }

    /// All sheets, in display order.
    pub fn list_sheets(&mut self) -> Vec<SheetRecord> {
        self.cache.get(&self.scanner)
    }

    /// Whether a directory exists for sheet `name`.
    ///
    /// Does not check that the directory holds a readable database.
    #[must_use]
    pub fn sheet_exists(&self, name: &str) -> bool {
        self.sheet_dir(name).is_some_and(|dir| dir.is_dir())
    }

    /// Entries of sheet `name`; empty if it is missing or unreadable.
    #[must_use]
    pub fn words_for(&self, name: &str) -> Vec<WordEntry> {
        let Some(folder) = self.sheet_dir(name) else {
            return Vec::new();
        };
        if !SheetStore::has_database(&folder) {
            return Vec::new();
        }

        self.store.read_all(&folder).unwrap_or_else(|e| {
            debug!(sheet = name, error = %e, "Failed to read sheet");
            Vec::new()
        })
    }

    /// Whether any sheet is stored.
    pub fn has_any_sheets(&mut self) -> bool {
        !self.list_sheets().is_empty()
    }

    /// First entry of the first listed sheet.
    pub fn first_word(&mut self) -> Option<WordEntry> {
        let first = self.list_sheets().into_iter().next()?;
        self.store
            .first_entry(&first.folder_path)
            .unwrap_or_else(|e| {
                debug!(sheet = %first.name, error = %e, "Failed to read first word");
                None
            })
    }

    /// Forget the cached index; the next listing goes back to disk.
    pub fn clear_cache(&mut self) {
        self.cache.invalidate();
    }

    /// Rebuild the index from the sheet directories.
    pub fn refresh(&mut self) -> Vec<SheetRecord> {
        self.cache.refresh(&self.scanner)
    }

    /// Remove every sheet and the index.
    ///
    /// Never fails; paths that could not be removed are listed in the
    /// report and, where supported, scheduled for deferred deletion.
    pub fn delete_all(&mut self) -> DeletionReport {
        let report = self.deletion.delete_all();
        self.cache.invalidate();
        self.saved_names.clear();
        report
    }
}

fn prepare_root(mut config: StoreConfig) -> Result<StoreConfig> {
    let unavailable = |path: &Path| Error::StorageUnavailable {
        path: path.to_path_buf(),
    };
    fs::create_dir_all(&config.root).map_err(|_| unavailable(&config.root))?;
    config.root = std::path::absolute(&config.root).map_err(|_| unavailable(&config.root))?;
    Ok(config)
}
