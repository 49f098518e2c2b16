//! Words command implementation.

use crate::cli::commands::open_repository;
use crate::error::{Error, Result};
use crate::model::WordEntry;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct WordsOutput<'a> {
    sheet: &'a str,
    words: &'a [WordEntry],
    count: usize,
}

/// Execute the words command.
///
/// # Errors
///
/// Returns [`Error::SheetNotFound`] if no sheet directory exists for `name`.
pub fn execute(name: &str, root: Option<&PathBuf>, json: bool) -> Result<()> {
    let repo = open_repository(root)?;
    if !repo.sheet_exists(name) {
        return Err(Error::SheetNotFound {
            name: name.to_string(),
        });
    }
    let words = repo.words_for(name);

    if json {
        let output = WordsOutput {
            sheet: name,
            words: &words,
            count: words.len(),
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("{} ({} words)", name.bold(), words.len());
    for (i, word) in words.iter().enumerate() {
        if word.part_of_speech.is_empty() {
            println!("{:>4}. {}  {}", i + 1, word.japanese, word.chinese);
        } else {
            println!(
                "{:>4}. {}  {}  {}",
                i + 1,
                word.japanese,
                word.chinese,
                format!("[{}]", word.part_of_speech).dimmed()
            );
        }
    }
    Ok(())
}
