//! Delete-all command implementation.

use crate::cli::commands::open_repository;
use crate::error::{Error, Result};
use colored::Colorize;
use std::path::PathBuf;

/// Execute the delete-all command.
///
/// # Errors
///
/// Returns an error if `--yes` was not given or the storage root cannot be
/// opened. Paths left behind are reported, not returned as errors.
pub fn execute(yes: bool, root: Option<&PathBuf>, json: bool) -> Result<()> {
    if !yes {
        return Err(Error::InvalidArgument(
            "Refusing to delete every sheet without --yes".to_string(),
        ));
    }

    let mut repo = open_repository(root)?;
    let report = repo.delete_all();

    if json {
        println!("{}", serde_json::to_string(&report)?);
        return Ok(());
    }

    println!(
        "{} Deleted {} sheet(s), {} file(s)",
        "✓".green(),
        report.removed_dirs,
        report.removed_files
    );
    if !report.deferred.is_empty() {
        println!(
            "{}",
            format!(
                "{} path(s) in use; they will be removed next time",
                report.deferred.len()
            )
            .yellow()
        );
        for path in &report.deferred {
            println!("  {}", path.display().to_string().dimmed());
        }
    }
    if !report.failed.is_empty() {
        println!("{}", format!("{} path(s) could not be removed", report.failed.len()).red());
        for path in &report.failed {
            println!("  {}", path.display());
        }
    }
    Ok(())
}
