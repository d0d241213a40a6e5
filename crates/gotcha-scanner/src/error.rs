//! Scan-level errors.
//!
//! Per-probe transport faults never show up here; they become ERROR verdicts.

use gotcha_core::{GotchaError, IdentifierKind};
use thiserror::Error;

/// Errors that abort a whole scan before or instead of producing a result.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The identifier failed validation
    #[error("invalid input: {0}")]
    InvalidInput(#[from] GotchaError),

    /// The scan request carries unusable limits
    #[error("invalid scan request: {0}")]
    InvalidRequest(String),

    /// No platform matched the requested categories and identifier kind
    #[error("no platforms selected for {kind} scan (check the category selection)")]
    NoPlatformsSelected {
        /// Kind of the identifier being scanned
        kind: IdentifierKind,
    },

    /// The scan was cancelled before it finished
    #[error("scan cancelled")]
    Cancelled,

    /// The HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Result type for scan operations.
pub type Result<T> = std::result::Result<T, ScanError>;
