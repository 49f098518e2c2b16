//! Status command implementation.

use crate::cli::commands::open_repository;
use crate::error::Result;
use crate::model::WordEntry;
use serde::Serialize;
use std::path::PathBuf;

/// Output for status command.
#[derive(Serialize)]
struct StatusOutput {
    root: String,
    has_sheets: bool,
    sheet_count: usize,
    total_words: u64,
    first_sheet: Option<String>,
    first_word: Option<WordEntry>,
}

/// Execute the status command.
///
/// # Errors
///
/// Returns an error if the storage root cannot be opened.
pub fn execute(root: Option<&PathBuf>, json: bool) -> Result<()> {
    let mut repo = open_repository(root)?;
    let sheets = repo.list_sheets();
    let first_word = repo.first_word();

    let output = StatusOutput {
        root: repo.root().display().to_string(),
        has_sheets: repo.has_any_sheets(),
        sheet_count: sheets.len(),
        total_words: sheets.iter().map(|s| s.word_count).sum(),
        first_sheet: sheets.first().map(|s| s.name.clone()),
        first_word,
    };

    if json {
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("Word Tables Status");
    println!("==================");
    println!();
    println!("Storage: {}", output.root);
    println!();

    if !output.has_sheets {
        println!("No sheets.");
        println!();
        println!("Import one with: wt import <workbook.json>");
        return Ok(());
    }

    println!("Sheets: {}", output.sheet_count);
    println!("Words:  {}", output.total_words);
    if let Some(ref name) = output.first_sheet {
        println!("First sheet: {name}");
    }
    if let Some(ref word) = output.first_word {
        println!("First word:  {} ({})", word.japanese, word.chinese);
    }
    Ok(())
}
