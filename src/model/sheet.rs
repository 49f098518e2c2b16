//! Sheet model for Word Tables.
//!
//! A sheet is one imported vocabulary collection, stored as one SQLite
//! database inside its own directory under the storage root.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::DB_FILE_NAME;

/// Summary of one stored sheet, as kept in the index side-file.
///
/// Field names are serialized in PascalCase to stay compatible with
/// existing `sheets_index.json` files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SheetRecord {
    /// Display name, recovered from the directory name
    pub name: String,

    /// Number of rows in the sheet database
    pub word_count: u64,

    /// Absolute path of the sheet directory
    pub folder_path: PathBuf,
}

impl SheetRecord {
    /// Path of this sheet's database file.
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        db_path_in(&self.folder_path)
    }
}

/// Path of the database file inside a sheet directory.
#[must_use]
pub fn db_path_in(folder: &Path) -> PathBuf {
    folder.join(DB_FILE_NAME)
}
