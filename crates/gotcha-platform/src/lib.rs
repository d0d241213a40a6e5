//! Gotcha Platform - Catalog of platforms the scanner knows how to probe.
//!
//! Each platform is described declaratively: a URL template, the identifier
//! kind it takes, a detection rule, and optional request settings. The
//! built-in catalog is compiled in from `definitions/*.toml`; users can add
//! more from a directory at startup.
//!
//! # Architecture
//!
//! - **Definition Types** ([`definition`]): Platform probe definitions and detection rules
//! - **Loader** ([`loader`]): TOML catalog parsing, built-in and on-disk
//! - **Registry** ([`registry`]): Immutable ordered catalog with category selection
//! - **Errors** ([`error`]): Platform-specific error types
//!
//! # Example
//!
//! ```rust
//! use gotcha_core::Category;
//! use gotcha_platform::PlatformRegistry;
//! use std::collections::BTreeSet;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = PlatformRegistry::builtin()?;
//!
//! let categories = BTreeSet::from([Category::Developer]);
//! for platform in registry.list_platforms(&categories, false) {
//!     println!("{} ({})", platform.name(), platform.id());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod definition;
pub mod error;
pub mod loader;
pub mod registry;

// Re-export commonly used types
pub use definition::{
    DetectionRule, HttpMethod, PlatformDefinition, RequestSpec, DOMAIN_PLACEHOLDER,
    EMAIL_PLACEHOLDER, LOCAL_PLACEHOLDER, USERNAME_PLACEHOLDER,
};
pub use error::{PlatformError, Result};
pub use loader::{builtin_definitions, parse_catalog, PlatformLoader};
pub use registry::PlatformRegistry;
