//! Exists command implementation.

use crate::cli::commands::open_repository;
use crate::error::{Error, Result};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct ExistsOutput<'a> {
    name: &'a str,
    exists: bool,
}

/// Execute the exists command.
///
/// # Errors
///
/// Returns [`Error::SheetNotFound`] (exit code 3) if the sheet is absent.
pub fn execute(name: &str, root: Option<&PathBuf>, json: bool) -> Result<()> {
    let repo = open_repository(root)?;
    if !repo.sheet_exists(name) {
        return Err(Error::SheetNotFound {
            name: name.to_string(),
        });
    }

    if json {
        let output = ExistsOutput { name, exists: true };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Sheet '{name}' exists");
    }
    Ok(())
}
