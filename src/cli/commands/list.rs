//! List command implementation.

use crate::cli::commands::open_repository;
use crate::error::Result;
use crate::model::SheetRecord;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct ListOutput<'a> {
    sheets: &'a [SheetRecord],
    count: usize,
}

/// Execute the list command.
///
/// # Errors
///
/// Returns an error if the storage root cannot be opened.
pub fn execute(root: Option<&PathBuf>, json: bool) -> Result<()> {
    let mut repo = open_repository(root)?;
    let sheets = repo.list_sheets();

    if json {
        let output = ListOutput {
            sheets: &sheets,
            count: sheets.len(),
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    print_sheets(&sheets);
    Ok(())
}

pub(crate) fn print_sheets(sheets: &[SheetRecord]) {
    if sheets.is_empty() {
        println!("No sheets.");
        println!();
        println!("Import one with: wt import <workbook.json>");
        return;
    }

    let width = sheets
        .iter()
        .map(|s| s.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Sheet".len());

    println!("{}", format!("{:<width$}  {:>6}", "Sheet", "Words").bold());
    for sheet in sheets {
        let pad = width - sheet.name.chars().count();
        println!("{}{}  {:>6}", sheet.name, " ".repeat(pad), sheet.word_count);
    }
    println!();
    println!("{}", format!("{} sheet(s)", sheets.len()).dimmed());
}
