//! Command implementations.

pub mod completions;
pub mod delete;
pub mod exists;
pub mod import;
pub mod list;
pub mod refresh;
pub mod save;
pub mod status;
pub mod version;
pub mod words;

use crate::config::{StoreConfig, resolve_storage_root};
use crate::error::{Error, Result};
use crate::repository::Repository;
use std::path::PathBuf;

/// Open the repository at the resolved storage root.
///
/// # Errors
///
/// Returns an error if no storage root can be determined or created.
pub fn open_repository(root: Option<&PathBuf>) -> Result<Repository> {
    let root = resolve_storage_root(root.map(PathBuf::as_path))
        .ok_or_else(|| Error::Config("Could not determine a storage directory".to_string()))?;
    Repository::open(StoreConfig::new(root))
}
