//! Local storage layer for Word Tables.
//!
//! This module provides the on-disk side of the engine:
//! - One SQLite database per sheet, opened per call
//! - Sheet name sanitizing and display ordering
//! - Best-effort bulk deletion with deferred fallback
//!
//! # Submodules
//!
//! - [`sanitize`] - Display name → directory name
//! - [`schema`] - Sheet database schema
//! - [`sheet_store`] - Per-sheet SQLite storage
//! - [`order`] - Sheet list ordering
//! - [`deletion`] - Bulk deletion
//! - [`deferred`] - Deferred deletion capability

pub mod deferred;
pub mod deletion;
pub mod file;
pub mod order;
pub mod sanitize;
pub mod schema;
pub mod sheet_store;

pub use deferred::{DeferredDeleter, NoopDeferredDeleter, PendingDeletions};
pub use deletion::{DeletionManager, DeletionReport, RemoveOutcome};
pub use sheet_store::{OpenHandles, SheetStore};
