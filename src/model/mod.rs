//! Data models for Word Tables.
//!
//! This module contains the values that cross the storage boundary:
//! - WordEntry
//! - SheetRecord

pub mod sheet;
pub mod word;

pub use sheet::SheetRecord;
pub use word::WordEntry;
