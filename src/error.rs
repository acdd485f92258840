//! Error types for the HelpHub sync CLI.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=store, 4=path, 6=document, etc.)
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers

use std::path::PathBuf;
use thiserror::Error;

use crate::sync::SyncError;
use crate::validate::PathError;

/// Result type alias for sync CLI operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Store (exit 2)
    NoStore,
    DatabaseError,
    TableNotFound,

    // Path / validation (exit 4)
    InvalidPath,
    InvalidArgument,

    // Document (exit 6)
    DocumentError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // User interrupt (exit 130)
    Interrupted,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::NoStore => "NO_STORE",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::TableNotFound => "TABLE_NOT_FOUND",
            Self::InvalidPath => "INVALID_PATH",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::DocumentError => "DOCUMENT_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::Interrupted => "INTERRUPTED",
        }
    }

    /// Category-based exit code.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::NoStore | Self::DatabaseError | Self::TableNotFound => 2,
            Self::InvalidPath | Self::InvalidArgument => 4,
            Self::DocumentError => 6,
            Self::IoError | Self::JsonError => 8,
            Self::Interrupted => 130,
        }
    }

    /// Whether retrying with corrected input can succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::InvalidPath | Self::InvalidArgument | Self::DocumentError | Self::DatabaseError
        )
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in sync CLI operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Record store not found")]
    NoStore {
        /// Locations that were tried, in priority order.
        searched: Vec<PathBuf>,
    },

    #[error("Table not found in record store: {table}")]
    TableNotFound { table: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Interrupted by user")]
    Interrupted,
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::NoStore { .. } => ErrorCode::NoStore,
            Self::TableNotFound { .. } => ErrorCode::TableNotFound,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::Path(_) => ErrorCode::InvalidPath,
            Self::Sync(_) => ErrorCode::DocumentError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Interrupted => ErrorCode::Interrupted,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::NoStore { searched } => {
                let mut hint = String::from("Pass the store with `--db <path>` or set HHSYNC_DB.");
                if !searched.is_empty() {
                    hint.push_str("\n  Looked in:");
                    for path in searched {
                        hint.push_str(&format!("\n    {}", path.display()));
                    }
                }
                Some(hint)
            }
            Self::TableNotFound { table } => Some(format!(
                "The store at --db does not contain a '{table}' table. Check that it is the ticketing database."
            )),
            Self::Path(e) => Some(e.suggestion().to_string()),
            Self::Sync(e) => e.suggestion().map(str::to_string),
            Self::Database(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::InvalidArgument(_)
            | Self::Interrupted => None,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_by_category() {
        assert_eq!(Error::NoStore { searched: vec![] }.exit_code(), 2);
        assert_eq!(Error::InvalidArgument("x".into()).exit_code(), 4);
        assert_eq!(Error::Interrupted.exit_code(), 130);
        assert_eq!(Error::Json(serde_json::from_str::<u8>("x").unwrap_err()).exit_code(), 8);
    }

    #[test]
    fn test_structured_json_includes_hint() {
        let err = Error::NoStore {
            searched: vec![PathBuf::from("/tmp/database.db")],
        };
        let json = err.to_structured_json();
        assert_eq!(json["error"]["code"], "NO_STORE");
        assert!(json["error"]["hint"].as_str().unwrap().contains("/tmp/database.db"));
    }

    #[test]
    fn test_path_error_maps_to_invalid_path() {
        let err = Error::from(PathError::Empty);
        assert_eq!(err.error_code(), ErrorCode::InvalidPath);
        assert!(err.hint().is_some());
    }
}
