//! Import command implementation.
//!
//! Accepts either a workbook (an array of `{"sheet", "words"}` objects) or a
//! bare array of entries, which is saved as one sheet named after the file.

use crate::cli::commands::open_repository;
use crate::error::{Error, Result};
use crate::model::WordEntry;
use crate::repository::SheetData;
use colored::Colorize;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Deserialize)]
#[serde(untagged)]
enum ImportFile {
    Workbook(Vec<SheetData>),
    Sheet(Vec<WordEntry>),
}

/// Execute the import command.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or a save fails.
pub fn execute(path: &Path, root: Option<&PathBuf>, json: bool) -> Result<()> {
    let batch = parse(path, &fs::read_to_string(path)?)?;

    let mut repo = open_repository(root)?;
    let summary = repo.import(batch)?;

    if json {
        println!("{}", serde_json::to_string(&summary)?);
        return Ok(());
    }

    println!(
        "{} Imported {} words from {}",
        "✓".green(),
        summary.total_words,
        path.display()
    );
    println!("  Created:     {}", summary.created);
    println!("  Overwritten: {}", summary.overwritten);
    if !summary.collisions.is_empty() {
        println!(
            "  {} {}",
            "Replaced a sheet with the same folder name:".yellow(),
            summary.collisions.join(", ")
        );
    }
    if !summary.skipped_empty.is_empty() {
        println!(
            "  Skipped empty: {}",
            summary.skipped_empty.join(", ").dimmed()
        );
    }
    Ok(())
}

fn parse(path: &Path, input: &str) -> Result<Vec<SheetData>> {
    let file: ImportFile = serde_json::from_str(input).map_err(|e| {
        Error::InvalidArgument(format!(
            "{} is neither a workbook nor an entry array: {e}",
            path.display()
        ))
    })?;

    match file {
        ImportFile::Workbook(sheets) => Ok(sheets),
        ImportFile::Sheet(words) => {
            let name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .ok_or_else(|| Error::InvalidArgument(format!("Cannot name a sheet after {}", path.display())))?;
            Ok(vec![SheetData { name, words }])
        }
    }
}
