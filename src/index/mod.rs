//! Sheet index.
//!
//! The index is a JSON side-file (`sheets_index.json`) summarising every
//! sheet so that listing does not have to open each database:
//!
//! - **Codec**: `Vec<SheetRecord>` ↔ JSON bytes
//! - **Scanner**: rebuilds the index from the sheet directories
//! - **Cache**: in-memory copy, trusted while the side-file's modification
//!   time is unchanged
//!
//! The side-file is only an accelerator. Any doubt about it (missing,
//! malformed, pointing at a sheet that no longer exists) is answered by a
//! full rescan, never by an error.

mod cache;
mod codec;
mod scanner;

pub use cache::{IndexCache, IndexMiss};
pub use codec::{decode, encode, read_index, write_index};
pub use scanner::Scanner;
