//! Save command implementation.

use crate::cli::commands::open_repository;
use crate::error::{Error, Result};
use crate::model::WordEntry;
use colored::Colorize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Execute the save command.
///
/// Entries come from `file`, or from stdin when no file is given, as a
/// JSON array of `{"japanese", "chinese", "part_of_speech"}` objects.
///
/// # Errors
///
/// Returns an error if the input cannot be read or parsed, or the save fails.
pub fn execute(name: &str, file: Option<&Path>, root: Option<&PathBuf>, json: bool) -> Result<()> {
    let input = read_input(file)?;
    let entries: Vec<WordEntry> = serde_json::from_str(&input)
        .map_err(|e| Error::InvalidArgument(format!("Expected a JSON array of entries: {e}")))?;

    let mut repo = open_repository(root)?;
    let outcome = repo.save(name, &entries)?;

    if json {
        println!("{}", serde_json::to_string(&outcome)?);
    } else {
        let verb = if outcome.replaced { "Replaced" } else { "Saved" };
        println!(
            "{} {verb} {} words in sheet '{}'",
            "✓".green(),
            outcome.word_count,
            outcome.name.bold()
        );
    }
    Ok(())
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => {
            let mut input = String::new();
            io::stdin().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}
