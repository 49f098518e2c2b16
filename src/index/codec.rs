//! JSON encoding of the sheet index.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::Result;
use crate::model::SheetRecord;
use crate::storage::file::atomic_write;

/// Encode records as a pretty-printed JSON array.
///
/// Field order is fixed: `Name`, `WordCount`, `FolderPath`.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn encode(records: &[SheetRecord]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(records)?)
}

/// Decode a JSON array of records.
///
/// # Errors
///
/// Returns an error for malformed or truncated input.
pub fn decode(bytes: &[u8]) -> Result<Vec<SheetRecord>> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Read and decode the index at `path`; `Ok(None)` if it does not exist.
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded.
pub fn read_index(path: &Path) -> Result<Option<Vec<SheetRecord>>> {
    match fs::read(path) {
        Ok(bytes) => decode(&bytes).map(Some),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Encode `records` and write them to `path` atomically.
///
/// # Errors
///
/// Returns an error if encoding or writing fails.
pub fn write_index(path: &Path, records: &[SheetRecord]) -> Result<()> {
    let bytes = encode(records)?;
    atomic_write(path, &bytes)?;
    Ok(())
}
