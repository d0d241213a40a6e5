//! Gotcha Scanner - Concurrent account-existence probing.
//!
//! This crate takes one identifier (a username or an email address), fans it
//! out to every selected platform in the registry, and classifies each HTTP
//! response into a verdict: FOUND, NOT_FOUND, INDETERMINATE, or ERROR.
//!
//! # Features
//!
//! - Semaphore-bounded concurrency with a per-probe timeout and an overall deadline
//! - Transport faults captured per probe; a timeout is never reported as absence
//! - Throttling and bot challenges reported as INDETERMINATE
//! - Deterministic, registry-ordered results regardless of completion order
//! - A [`Fetcher`] seam so scans can run against stub transports
//! - MX, SPF, and DMARC analysis of email domains
//!
//! # Example
//!
//! ```rust,no_run
//! use gotcha_core::{Category, Identifier, ScanningConfig};
//! use gotcha_platform::PlatformRegistry;
//! use gotcha_scanner::{ProbeExecutor, ScanCoordinator, ScanRequest};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ScanningConfig::default();
//! let coordinator = ScanCoordinator::new(
//!     Arc::new(PlatformRegistry::builtin()?),
//!     Arc::new(ProbeExecutor::http(&config)?),
//! );
//!
//! let request = ScanRequest::new([Category::Developer]).with_config(&config);
//! let result = coordinator
//!     .scan(&Identifier::username("octocat")?, &request)
//!     .await?;
//!
//! for verdict in result.found() {
//!     println!("{}: {:?}", verdict.platform_name, verdict.profile_url);
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

pub mod classifier;
pub mod coordinator;
pub mod domain;
pub mod error;
pub mod probe;
pub mod url_builder;
pub mod verdict;

// Re-export commonly used types
pub use classifier::classify;
pub use coordinator::{ScanCoordinator, ScanRequest, DEFAULT_CONCURRENCY_LIMIT, DEFAULT_TIMEOUT};
pub use domain::{DomainAnalyzer, DomainReport, DomainResolver, HickoryResolver, MxRecord};
pub use error::{Result, ScanError};
pub use probe::{
    FetchedResponse, Fetcher, HttpFetcher, ProbeExecutor, RawOutcome, TransportError,
    TransportErrorKind,
};
pub use url_builder::{build_probe_request, build_profile_url, ProbeRequest};
pub use verdict::{ScanResult, ScanSummary, Verdict, VerdictKind};
