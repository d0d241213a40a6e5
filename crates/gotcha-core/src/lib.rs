//! Gotcha Core - Foundation crate for the Gotcha account-probing engine.
//!
//! This crate provides the shared identifier types, error handling, and
//! configuration management that the platform registry, the scanner, the
//! reporter, and the command-line front end all depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Shared newtypes and enums (`Identifier`, `EmailAddress`, `Category`, `PlatformId`, `Timestamp`)
//!
//! # Example
//!
//! ```rust
//! use gotcha_core::{AppConfig, Identifier, IdentifierKind};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! assert_eq!(config.scanning.concurrency_limit, 50);
//!
//! let target = Identifier::parse("user@example.com")?;
//! assert_eq!(target.kind(), IdentifierKind::Email);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, OutputConfig, PlatformsConfig, ScanningConfig};
pub use error::{ConfigError, ConfigResult, GotchaError, Result};
pub use types::{
    Category, EmailAddress, Identifier, IdentifierKind, PlatformId, Timestamp, Username,
};
