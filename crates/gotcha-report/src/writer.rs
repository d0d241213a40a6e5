//! Writing reports to disk.
//!
//! Reports are written to a temporary file in the destination directory and
//! renamed into place, so an interrupted run never leaves a truncated report.

use crate::error::{ReportError, Result};
use crate::format::ReportFormat;
use crate::render::{render, ReportOptions};
use gotcha_scanner::ScanResult;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::info;

/// Atomically replace `path` with `contents`.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(contents.as_bytes())?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| ReportError::Persist {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

/// Render `results` and write them to `path`.
pub fn save_report(
    path: &Path,
    results: &[ScanResult],
    format: ReportFormat,
    options: ReportOptions,
) -> Result<()> {
    let contents = render(results, format, options)?;
    write_atomic(path, &contents)?;

    info!(
        path = %path.display(),
        format = %format,
        scans = results.len(),
        "report saved"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_replaces_file() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("report.txt");

        write_atomic(&path, "first").expect("first write");
        write_atomic(&path, "second").expect("second write");

        assert_eq!(std::fs::read_to_string(&path).expect("read report"), "second");

        let leftovers = std::fs::read_dir(tmp.path()).expect("read dir").count();
        assert_eq!(leftovers, 1, "temp files must not be left behind");
    }

    #[test]
    fn test_write_atomic_missing_directory() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("absent").join("report.json");

        assert!(matches!(write_atomic(&path, "{}"), Err(ReportError::Io(_))));
        assert!(!path.exists());
    }
}
