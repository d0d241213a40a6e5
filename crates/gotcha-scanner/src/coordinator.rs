//! Scan coordinator: fans one identifier out to every selected platform.
//!
//! Probes run as tasks on a `JoinSet`, gated by a semaphore so at most
//! `concurrency_limit` are in flight. Each selected platform owns one slot in
//! a pre-allocated vector; the coordinator is the only writer. The scan never
//! stops early on FOUND or ERROR, and it never waits past its deadline.

use crate::classifier::classify;
use crate::error::{Result, ScanError};
use crate::probe::{ProbeExecutor, TransportError, TransportErrorKind};
use crate::verdict::{ScanResult, Verdict};
use gotcha_core::{Category, Identifier, IdentifierKind, ScanningConfig, Timestamp};
use gotcha_platform::{PlatformDefinition, PlatformRegistry};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Default number of probes in flight.
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 50;

/// Default per-probe timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// What to scan and how hard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    /// Categories to probe
    pub categories: BTreeSet<Category>,
    /// Allow adult-flagged platforms
    pub include_adult: bool,
    /// Maximum number of probes in flight
    pub concurrency_limit: usize,
    /// Per-probe timeout
    pub timeout: Duration,
    /// Overall deadline; derived from the timeout when `None`
    pub deadline: Option<Duration>,
}

impl ScanRequest {
    /// A request for `categories` with default limits and adult content excluded.
    pub fn new(categories: impl IntoIterator<Item = Category>) -> Self {
        Self {
            categories: categories.into_iter().collect(),
            include_adult: false,
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
            timeout: DEFAULT_TIMEOUT,
            deadline: None,
        }
    }

    /// Take limits and timeouts from the scanning configuration.
    #[must_use]
    pub fn with_config(mut self, config: &ScanningConfig) -> Self {
        self.concurrency_limit = config.concurrency_limit;
        self.timeout = config.timeout();
        self.deadline = config.scan_deadline();
        self
    }

    /// Allow or forbid adult-flagged platforms.
    #[must_use]
    pub fn with_include_adult(mut self, include_adult: bool) -> Self {
        self.include_adult = include_adult;
        self
    }

    /// Set the maximum number of probes in flight.
    #[must_use]
    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit;
        self
    }

    /// Set the per-probe timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set an explicit overall deadline.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Check the limits.
    pub fn validate(&self) -> Result<()> {
        if self.concurrency_limit == 0 {
            return Err(ScanError::InvalidRequest(
                "concurrency limit must be greater than zero".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(ScanError::InvalidRequest(
                "timeout must be greater than zero".to_string(),
            ));
        }
        if self.deadline.is_some_and(|d| d.is_zero()) {
            return Err(ScanError::InvalidRequest(
                "deadline must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// The deadline for `platform_count` probes: the explicit one if set,
    /// otherwise one timeout per wave of probes plus one spare.
    #[must_use]
    pub fn effective_deadline(&self, platform_count: usize) -> Duration {
        self.deadline.unwrap_or_else(|| {
            let waves = platform_count.div_ceil(self.concurrency_limit.max(1)) + 1;
            self.timeout
                .saturating_mul(u32::try_from(waves).unwrap_or(u32::MAX))
        })
    }
}

impl Default for ScanRequest {
    fn default() -> Self {
        Self::new(Category::ALL.into_iter().filter(|c| *c != Category::Adult))
    }
}

/// Runs scans against a platform registry.
#[derive(Debug, Clone)]
pub struct ScanCoordinator {
    registry: Arc<PlatformRegistry>,
    executor: Arc<ProbeExecutor>,
}

impl ScanCoordinator {
    /// Create a coordinator.
    #[must_use]
    pub fn new(registry: Arc<PlatformRegistry>, executor: Arc<ProbeExecutor>) -> Self {
        Self { registry, executor }
    }

    /// The platforms a scan of `kind` would probe, in registry order.
    #[must_use]
    pub fn select_platforms(
        &self,
        kind: IdentifierKind,
        request: &ScanRequest,
    ) -> Vec<Arc<PlatformDefinition>> {
        self.registry
            .list_platforms(&request.categories, request.include_adult)
            .into_iter()
            .filter(|p| p.accepts(kind))
            .collect()
    }

    /// Validate raw user input as `kind`, then scan it.
    ///
    /// Invalid input is rejected before any probe is issued.
    pub async fn scan_input(
        &self,
        kind: IdentifierKind,
        input: &str,
        request: &ScanRequest,
    ) -> Result<ScanResult> {
        let identifier = match kind {
            IdentifierKind::Username => Identifier::username(input.trim())?,
            IdentifierKind::Email => Identifier::email(input)?,
        };
        self.scan(&identifier, request).await
    }

    /// Scan one identifier to completion.
    pub async fn scan(&self, identifier: &Identifier, request: &ScanRequest) -> Result<ScanResult> {
        self.scan_with_cancel(identifier, request, &CancellationToken::new())
            .await
    }

    /// Scan one identifier, giving up with [`ScanError::Cancelled`] when `cancel` fires.
    pub async fn scan_with_cancel(
        &self,
        identifier: &Identifier,
        request: &ScanRequest,
        cancel: &CancellationToken,
    ) -> Result<ScanResult> {
        request.validate()?;

        let platforms = self.select_platforms(identifier.kind(), request);
        if platforms.is_empty() {
            return Err(ScanError::NoPlatformsSelected {
                kind: identifier.kind(),
            });
        }

        let scan_id = Uuid::new_v4();
        let started_at = Timestamp::now();
        let clock = Instant::now();
        let deadline = request.effective_deadline(platforms.len());

        info!(
            %scan_id,
            target = %identifier,
            platforms = platforms.len(),
            concurrency = request.concurrency_limit,
            deadline_secs = deadline.as_secs(),
            "starting scan"
        );

        let semaphore = Arc::new(Semaphore::new(request.concurrency_limit));
        let mut slots: Vec<Option<Verdict>> = vec![None; platforms.len()];
        let mut tasks = JoinSet::new();

        for (slot, platform) in platforms.iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let executor = Arc::clone(&self.executor);
            let platform = Arc::clone(platform);
            let identifier = identifier.clone();
            let timeout = request.timeout;

            tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return (slot, Verdict::error(&platform, "semaphore closed", Duration::ZERO));
                };
                let outcome = executor.probe(&identifier, &platform, timeout).await;
                (slot, classify(&outcome, &platform, &identifier))
            });
        }

        let expiry = tokio::time::sleep(deadline);
        tokio::pin!(expiry);
        let mut deadline_hit = false;
        let mut task_faults = 0usize;

        loop {
            tokio::select! {
                biased;

                () = cancel.cancelled() => {
                    tasks.abort_all();
                    warn!(%scan_id, pending = tasks.len(), "scan cancelled");
                    return Err(ScanError::Cancelled);
                }

                () = &mut expiry => {
                    deadline_hit = true;
                    warn!(
                        %scan_id,
                        pending = tasks.len(),
                        deadline_secs = deadline.as_secs(),
                        "scan deadline reached, aborting unfinished probes"
                    );
                    tasks.abort_all();
                    break;
                }

                joined = tasks.join_next() => match joined {
                    Some(Ok((slot, verdict))) => {
                        debug!(platform = %verdict.platform_id, status = %verdict.status, "verdict");
                        slots[slot] = Some(verdict);
                    }
                    Some(Err(e)) => {
                        task_faults += 1;
                        debug!(error = %e, "probe task failed");
                    }
                    None => break,
                },
            }
        }

        if task_faults > 0 {
            warn!(%scan_id, task_faults, "probe tasks failed unexpectedly; marked as ERROR");
        }

        let (unfinished, unfinished_elapsed) = if deadline_hit {
            let error = TransportError::new(
                TransportErrorKind::Timeout,
                format!("scan deadline of {}ms reached", deadline.as_millis()),
            );
            (error, deadline)
        } else {
            let error = TransportError::new(TransportErrorKind::Internal, "probe task failed");
            (error, clock.elapsed())
        };

        let mut categories: BTreeMap<Category, Vec<Verdict>> = BTreeMap::new();
        for (platform, slot) in platforms.iter().zip(slots) {
            let verdict = slot
                .unwrap_or_else(|| {
                Verdict::error(platform, unfinished.to_string(), unfinished_elapsed)
            });
            categories
                .entry(platform.category())
                .or_default()
                .push(verdict);
        }

        let result = ScanResult {
            scan_id,
            identifier: identifier.clone(),
            started_at,
            finished_at: Timestamp::now(),
            categories,
            domain: None,
        };

        let summary = result.summary();
        info!(
            %scan_id,
            total = summary.total,
            found = summary.found,
            not_found = summary.not_found,
            indeterminate = summary.indeterminate,
            errors = summary.error,
            elapsed_ms = u64::try_from(result.duration().as_millis()).unwrap_or(u64::MAX),
            "scan complete"
        );

        Ok(result)
    }
}
