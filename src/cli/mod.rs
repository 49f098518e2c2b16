//! CLI definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for list/query commands.
#[derive(ValueEnum, Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table (default)
    #[default]
    Table,
    /// JSON (same as --json)
    Json,
}

pub mod commands;

/// Word Tables - local storage for Japanese vocabulary sheets
#[derive(Parser, Debug)]
#[command(name = "wt", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Storage root (default: <data dir>/日语单词斩/WordTables)
    #[arg(long, global = true, env = "WT_ROOT")]
    pub root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Output format (table, json)
    #[arg(long, value_enum, global = true, default_value_t)]
    pub format: OutputFormat,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Save a sheet, replacing its contents
    Save {
        /// Sheet name
        name: String,

        /// JSON file with an array of entries (default: read stdin)
        #[arg(long, short)]
        file: Option<PathBuf>,
    },

    /// Import a workbook: an array of {"sheet", "words"} objects
    Import {
        /// JSON file to import
        path: PathBuf,
    },

    /// List sheets in display order
    List,

    /// Show the entries of a sheet
    Words {
        /// Sheet name
        name: String,
    },

    /// Check whether a sheet exists (exit code 3 if not)
    Exists {
        /// Sheet name
        name: String,
    },

    /// Show storage status
    Status,

    /// Rebuild the sheet index from disk
    Refresh,

    /// Delete every sheet and the index
    DeleteAll {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },

    /// Print version information
    Version,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}
