//! Gotcha Report - Rendering and saving scan results.
//!
//! Three formats are supported:
//!
//! - **JSON**: one document with every scan, its verdicts, and a summary
//! - **CSV**: one row per verdict, for spreadsheets and scripts
//! - **Text**: a readable listing grouped by category
//!
//! Files are written atomically via [`write_atomic`].
//!
//! # Example
//!
//! ```rust,no_run
//! use gotcha_report::{save_report, ReportFormat, ReportOptions};
//! use gotcha_scanner::ScanResult;
//! use std::path::Path;
//!
//! # fn run(results: Vec<ScanResult>) -> Result<(), Box<dyn std::error::Error>> {
//! save_report(
//!     Path::new("report.csv"),
//!     &results,
//!     ReportFormat::Csv,
//!     ReportOptions::default(),
//! )?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod format;
pub mod render;
pub mod writer;

// Re-export commonly used types
pub use error::{ReportError, Result};
pub use format::ReportFormat;
pub use render::{render, render_csv, render_json, render_text, ReportOptions};
pub use writer::{save_report, write_atomic};
