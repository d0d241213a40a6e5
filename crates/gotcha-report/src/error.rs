//! Error types for report rendering and writing.

use thiserror::Error;

/// Errors that can occur while producing a report.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Unknown report format name
    #[error("unknown report format '{0}' (expected json, csv, or txt)")]
    UnknownFormat(String),

    /// JSON serialization failed
    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error while writing the report
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The finished temp file could not be moved into place
    #[error("failed to write report to {path}: {source}")]
    Persist {
        /// Destination path
        path: String,
        /// Underlying error
        #[source]
        source: tempfile::PersistError,
    },
}

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;
