//! Error types for the platform catalog.

use thiserror::Error;

/// Errors that can occur while loading or querying platform definitions.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Platform definition not found
    #[error("platform definition not found: {platform_id}")]
    NotFound {
        /// The platform ID that was not found
        platform_id: String,
    },

    /// Failed to read a definition file
    #[error("failed to load platform definitions from {path}: {source}")]
    LoadError {
        /// Path to the definition file
        path: String,
        /// Underlying error
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to parse definition TOML
    #[error("failed to parse platform definition TOML in {path}: {source}")]
    ParseError {
        /// Path (or built-in catalog name) of the definition file
        path: String,
        /// TOML parse error
        #[source]
        source: toml::de::Error,
    },

    /// Invalid platform definition (validation failed)
    #[error("invalid platform definition for {platform_id}: {reason}")]
    ValidationError {
        /// Platform ID being validated
        platform_id: String,
        /// Reason for validation failure
        reason: String,
    },

    /// Two definitions share an ID
    #[error("duplicate platform ID: {platform_id}")]
    DuplicateId {
        /// The repeated platform ID
        platform_id: String,
    },

    /// Definitions directory not found
    #[error("platform definitions directory not found at {path}")]
    DirectoryNotFound {
        /// Expected directory path
        path: String,
    },

    /// I/O error while accessing definitions
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for platform catalog operations.
pub type Result<T> = std::result::Result<T, PlatformError>;
