//! Refresh command implementation.

use crate::cli::commands::{list::print_sheets, open_repository};
use crate::config::INDEX_FILE_NAME;
use crate::error::Result;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct RefreshOutput {
    count: usize,
    index: String,
}

/// Execute the refresh command: rebuild the index from the sheet databases.
///
/// # Errors
///
/// Returns an error if the storage root cannot be opened.
pub fn execute(root: Option<&PathBuf>, json: bool) -> Result<()> {
    let mut repo = open_repository(root)?;
    let sheets = repo.refresh();

    if json {
        let output = RefreshOutput {
            count: sheets.len(),
            index: repo.root().join(INDEX_FILE_NAME).display().to_string(),
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("Rebuilt index.");
    println!();
    print_sheets(&sheets);
    Ok(())
}
