//! Verdicts and scan results.

use crate::domain::DomainReport;
use gotcha_core::{Category, Identifier, PlatformId, Timestamp};
use gotcha_platform::PlatformDefinition;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Outcome of one probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerdictKind {
    /// The account exists
    Found,
    /// The platform answered that the account does not exist
    NotFound,
    /// The platform answered ambiguously (anti-bot, unexpected status)
    Indeterminate,
    /// The probe failed; says nothing about the account
    Error,
}

impl VerdictKind {
    /// Uppercase label used in reports.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Found => "FOUND",
            Self::NotFound => "NOT_FOUND",
            Self::Indeterminate => "INDETERMINATE",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for VerdictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The classified result of probing one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Platform ID
    pub platform_id: PlatformId,
    /// Platform display name
    pub platform_name: String,
    /// Platform category
    pub category: Category,
    /// Verdict
    pub status: VerdictKind,
    /// Profile URL, only when found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_url: Option<String>,
    /// HTTP status code, when a response arrived
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    /// Time spent on the probe, in milliseconds
    pub elapsed_ms: u64,
    /// Short explanation for INDETERMINATE and ERROR verdicts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Verdict {
    pub(crate) fn new(platform: &PlatformDefinition, status: VerdictKind, elapsed: Duration) -> Self {
        Self {
            platform_id: platform.id().clone(),
            platform_name: platform.name().to_string(),
            category: platform.category(),
            status,
            profile_url: None,
            http_status: None,
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            detail: None,
        }
    }

    /// ERROR verdict for a probe that never produced an outcome.
    #[must_use]
    pub fn error(
        platform: &PlatformDefinition,
        detail: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self::new(platform, VerdictKind::Error, elapsed).with_detail(detail)
    }

    pub(crate) fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Time spent on the probe.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }

    /// Whether the account was found.
    #[must_use]
    pub fn is_found(&self) -> bool {
        self.status == VerdictKind::Found
    }
}

/// Verdict counts for one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Number of platforms probed
    pub total: usize,
    /// FOUND verdicts
    pub found: usize,
    /// NOT_FOUND verdicts
    pub not_found: usize,
    /// INDETERMINATE verdicts
    pub indeterminate: usize,
    /// ERROR verdicts
    pub error: usize,
}

/// The complete result of scanning one identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// Unique ID of this scan
    pub scan_id: Uuid,
    /// The scanned identifier
    pub identifier: Identifier,
    /// When probing started
    pub started_at: Timestamp,
    /// When the last verdict was collected
    pub finished_at: Timestamp,
    /// Verdicts per category, each in registry order
    pub categories: BTreeMap<Category, Vec<Verdict>>,
    /// Email domain analysis, when requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<DomainReport>,
}

impl ScanResult {
    /// A result holding only a domain analysis, for runs that probe no platform.
    #[must_use]
    pub fn domain_only(identifier: Identifier, report: DomainReport) -> Self {
        let now = Timestamp::now();
        Self {
            scan_id: Uuid::new_v4(),
            identifier,
            started_at: now,
            finished_at: now,
            categories: BTreeMap::new(),
            domain: Some(report),
        }
    }

    /// Attach a domain analysis.
    #[must_use]
    pub fn with_domain(mut self, report: DomainReport) -> Self {
        self.domain = Some(report);
        self
    }

    /// All verdicts, category by category.
    pub fn verdicts(&self) -> impl Iterator<Item = &Verdict> {
        self.categories.values().flatten()
    }

    /// Verdicts for which the account was found.
    pub fn found(&self) -> impl Iterator<Item = &Verdict> {
        self.verdicts().filter(|v| v.is_found())
    }

    /// Number of verdicts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    /// Whether the result holds no verdicts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Count verdicts by kind.
    #[must_use]
    pub fn summary(&self) -> ScanSummary {
        let mut summary = ScanSummary::default();
        for verdict in self.verdicts() {
            summary.total += 1;
            match verdict.status {
                VerdictKind::Found => summary.found += 1,
                VerdictKind::NotFound => summary.not_found += 1,
                VerdictKind::Indeterminate => summary.indeterminate += 1,
                VerdictKind::Error => summary.error += 1,
            }
        }
        summary
    }

    /// Whether every probe failed, so the scan says nothing at all.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        !self.is_empty() && self.verdicts().all(|v| v.status == VerdictKind::Error)
    }

    /// Wall time of the scan.
    #[must_use]
    pub fn duration(&self) -> Duration {
        (*self.finished_at.as_datetime() - *self.started_at.as_datetime())
            .to_std()
            .unwrap_or_default()
    }
}
