//! Report formats.

use crate::error::ReportError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Output format of a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Pretty-printed JSON document
    #[default]
    Json,
    /// One row per verdict
    Csv,
    /// Human-readable text
    Txt,
}

impl ReportFormat {
    /// Every format, for help output.
    pub const ALL: [ReportFormat; 3] = [Self::Json, Self::Csv, Self::Txt];

    /// Lowercase name, also the usual file extension.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Txt => "txt",
        }
    }

    /// Guess the format from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "txt" | "text" => Ok(Self::Txt),
            other => Err(ReportError::UnknownFormat(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format() {
        assert_eq!("json".parse::<ReportFormat>().ok(), Some(ReportFormat::Json));
        assert_eq!("CSV".parse::<ReportFormat>().ok(), Some(ReportFormat::Csv));
        assert_eq!("text".parse::<ReportFormat>().ok(), Some(ReportFormat::Txt));
        assert!(matches!(
            "xml".parse::<ReportFormat>(),
            Err(ReportError::UnknownFormat(_))
        ));
    }

    #[test]
    fn test_from_path() {
        assert_eq!(
            ReportFormat::from_path(Path::new("out/report.csv")),
            Some(ReportFormat::Csv)
        );
        assert_eq!(ReportFormat::from_path(Path::new("report")), None);
    }
}
