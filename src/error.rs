//! Error types for Word Tables.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=db, 3=not_found, 4=validation, etc.)
//! - Retryability flags
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers
//!
//! Only write paths surface these errors. Recoverable conditions on the
//! read and delete paths are modelled as values instead
//! (see [`crate::index::IndexMiss`] and [`crate::storage::RemoveOutcome`]).

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Word Tables operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Database (exit 2)
    DatabaseError,
    WriteFailed,

    // Not Found (exit 3)
    SheetNotFound,

    // Validation (exit 4)
    InvalidSheetName,
    InvalidArgument,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::DatabaseError => "DATABASE_ERROR",
            Self::WriteFailed => "WRITE_FAILED",
            Self::SheetNotFound => "SHEET_NOT_FOUND",
            Self::InvalidSheetName => "INVALID_SHEET_NAME",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::DatabaseError | Self::WriteFailed => 2,
            Self::SheetNotFound => 3,
            Self::InvalidSheetName | Self::InvalidArgument => 4,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
        }
    }

    /// Whether retrying the same call unchanged can succeed.
    ///
    /// Database errors are usually lock contention from another process.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::DatabaseError)
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in Word Tables operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Sheet not found: {name}")]
    SheetNotFound { name: String },

    #[error("Invalid sheet name: {name:?} has no characters usable in a directory name")]
    InvalidSheetName { name: String },

    #[error("Failed to save sheet '{sheet}': {source}")]
    SaveFailed {
        sheet: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Storage root unavailable: {}", path.display())]
    StorageUnavailable { path: PathBuf },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::SheetNotFound { .. } => ErrorCode::SheetNotFound,
            Self::InvalidSheetName { .. } => ErrorCode::InvalidSheetName,
            Self::SaveFailed { .. } => ErrorCode::WriteFailed,
            Self::StorageUnavailable { .. } => ErrorCode::ConfigError,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Wrap a storage failure that happened while saving `sheet`.
    pub(crate) fn save_failed(sheet: &str, source: Error) -> Self {
        // Name validation is already specific enough on its own.
        if matches!(source, Self::InvalidSheetName { .. }) {
            return source;
        }
        Self::SaveFailed {
            sheet: sheet.to_string(),
            source: Box::new(source),
        }
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::SheetNotFound { name } => Some(format!(
                "No sheet named '{name}'. Use `wt list` to see imported sheets."
            )),

            Self::InvalidSheetName { .. } => Some(
                "Sheet names must keep at least one character other than path separators \
                 after sanitizing, and cannot be '.' or '..'."
                    .to_string(),
            ),

            Self::SaveFailed { source, .. } => match source.as_ref() {
                Self::Io(e) if e.kind() == std::io::ErrorKind::PermissionDenied => Some(
                    "The storage directory is not writable. Check its permissions or pass --root."
                        .to_string(),
                ),
                Self::Database(_) => Some(
                    "Another program may be holding the sheet database open. Close it and retry."
                        .to_string(),
                ),
                _ => None,
            },

            Self::StorageUnavailable { path } => Some(format!(
                "Could not create {}. Pass --root or set WORDTABLES_HOME.",
                path.display()
            )),

            Self::Config(_) => {
                Some("Pass --root or set WORDTABLES_HOME to choose a storage directory.".to_string())
            }

            Self::Database(_) | Self::Io(_) | Self::Json(_) | Self::InvalidArgument(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}
