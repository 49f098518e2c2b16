//! Word Tables - local storage for Japanese vocabulary sheets.
//!
//! A sheet is a named list of [`WordEntry`] values. Each sheet lives in its
//! own SQLite database under a single storage root, and a JSON index next to
//! the sheet directories lets the sheet list load without opening every
//! database.
//!
//! # Architecture
//!
//! - [`repository`] - The facade: save, list, read, and wipe sheets
//! - [`worker`] - Async handle that runs repository calls off the caller's thread
//! - [`index`] - Index side-file codec, cache, and rescanner
//! - [`storage`] - Per-sheet databases, name sanitizing, ordering, deletion
//! - [`model`] - Data types (WordEntry, SheetRecord)
//! - [`config`] - Storage root resolution and tunables
//! - [`cli`] - Command-line interface using clap
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod index;
pub mod model;
pub mod repository;
pub mod storage;
pub mod worker;

pub use config::StoreConfig;
pub use error::{Error, Result};
pub use model::{SheetRecord, WordEntry};
pub use repository::{ImportSummary, Repository, SaveOutcome, SheetData};
pub use storage::{DeletionReport, DeferredDeleter, NoopDeferredDeleter, PendingDeletions};
pub use worker::RepositoryHandle;
