//! Email domain analysis: mail exchangers and sender policy records.
//!
//! Runs next to the platform scan for email targets. Lookups go through the
//! [`DomainResolver`] trait; [`HickoryResolver`] is the DNS implementation.
//! Like probes, analysis never fails: lookup faults are recorded on the report.

use crate::probe::{TransportError, TransportErrorKind};
use async_trait::async_trait;
use gotcha_core::EmailAddress;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::TokioAsyncResolver;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Domains of large free mailbox providers.
const FREE_PROVIDERS: &[&str] = &[
    "aol.com",
    "gmail.com",
    "gmx.com",
    "gmx.de",
    "googlemail.com",
    "hotmail.com",
    "icloud.com",
    "live.com",
    "mail.com",
    "mail.ru",
    "me.com",
    "msn.com",
    "outlook.com",
    "proton.me",
    "protonmail.com",
    "yahoo.com",
    "yandex.ru",
    "zoho.com",
];

/// One MX record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MxRecord {
    /// Lower is preferred
    pub preference: u16,
    /// Mail exchanger host, without the trailing dot
    pub exchange: String,
}

/// What the DNS says about an email address's domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainReport {
    /// The analyzed domain
    pub domain: String,
    /// Mail exchangers, most preferred first
    pub mx_records: Vec<MxRecord>,
    /// The `v=spf1` TXT record, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spf: Option<String>,
    /// The `_dmarc` TXT record, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dmarc: Option<String>,
    /// The DMARC `p=` policy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dmarc_policy: Option<String>,
    /// Whether the domain is a well-known free mailbox provider
    pub free_provider: bool,
    /// Lookups that failed, as `kind: message`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lookup_errors: Vec<String>,
}

impl DomainReport {
    /// Whether the domain publishes at least one mail exchanger.
    #[must_use]
    pub fn accepts_mail(&self) -> bool {
        !self.mx_records.is_empty()
    }
}

/// DNS lookups used by the analysis.
///
/// A name without records of the requested type yields an empty list, not an
/// error.
#[async_trait]
pub trait DomainResolver: Send + Sync {
    /// MX records of `domain`.
    async fn mx(&self, domain: &str) -> Result<Vec<MxRecord>, TransportError>;

    /// TXT records of `name`, each joined into one string.
    async fn txt(&self, name: &str) -> Result<Vec<String>, TransportError>;
}

/// [`DomainResolver`] backed by the hickory async resolver.
#[derive(Clone)]
pub struct HickoryResolver {
    inner: TokioAsyncResolver,
}

impl HickoryResolver {
    /// A resolver using the default upstream configuration.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        let mut opts = ResolverOpts::default();
        opts.timeout = timeout;
        Self {
            inner: TokioAsyncResolver::tokio(ResolverConfig::default(), opts),
        }
    }
}

impl std::fmt::Debug for HickoryResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HickoryResolver").finish_non_exhaustive()
    }
}

fn resolve_error(name: &str, error: &ResolveError) -> TransportError {
    let kind = match error.kind() {
        ResolveErrorKind::Timeout => TransportErrorKind::Timeout,
        _ => TransportErrorKind::Dns,
    };
    TransportError::new(kind, format!("{name}: {error}"))
}

fn is_no_records(error: &ResolveError) -> bool {
    matches!(error.kind(), ResolveErrorKind::NoRecordsFound { .. })
}

#[async_trait]
impl DomainResolver for HickoryResolver {
    async fn mx(&self, domain: &str) -> Result<Vec<MxRecord>, TransportError> {
        match self.inner.mx_lookup(domain).await {
            Ok(lookup) => Ok(lookup
                .iter()
                .map(|mx| MxRecord {
                    preference: mx.preference(),
                    exchange: mx.exchange().to_string().trim_end_matches('.').to_string(),
                })
                .collect()),
            Err(e) if is_no_records(&e) => Ok(Vec::new()),
            Err(e) => Err(resolve_error(domain, &e)),
        }
    }

    async fn txt(&self, name: &str) -> Result<Vec<String>, TransportError> {
        match self.inner.txt_lookup(name).await {
            Ok(lookup) => Ok(lookup.iter().map(ToString::to_string).collect()),
            Err(e) if is_no_records(&e) => Ok(Vec::new()),
            Err(e) => Err(resolve_error(name, &e)),
        }
    }
}

/// Runs domain analyses against a shared [`DomainResolver`].
#[derive(Clone)]
pub struct DomainAnalyzer {
    resolver: Arc<dyn DomainResolver>,
    timeout: Duration,
}

impl DomainAnalyzer {
    /// Create an analyzer; each lookup gives up after `timeout`.
    #[must_use]
    pub fn new(resolver: Arc<dyn DomainResolver>, timeout: Duration) -> Self {
        Self { resolver, timeout }
    }

    /// Create an analyzer backed by the system DNS path.
    #[must_use]
    pub fn dns(timeout: Duration) -> Self {
        Self::new(Arc::new(HickoryResolver::new(timeout)), timeout)
    }

    /// Analyze the domain of `email`.
    pub async fn analyze(&self, email: &EmailAddress) -> DomainReport {
        let domain = email.domain().to_ascii_lowercase();
        let dmarc_name = format!("_dmarc.{domain}");
        debug!(%domain, "analyzing email domain");

        let (mx, txt, dmarc) = tokio::join!(
            self.bounded(&domain, self.resolver.mx(&domain)),
            self.bounded(&domain, self.resolver.txt(&domain)),
            self.bounded(&dmarc_name, self.resolver.txt(&dmarc_name)),
        );

        let mut report = DomainReport {
            free_provider: FREE_PROVIDERS.contains(&domain.as_str()),
            domain,
            ..DomainReport::default()
        };

        match mx {
            Ok(mut records) => {
                records.sort_by(|a, b| {
                    a.preference
                        .cmp(&b.preference)
                        .then_with(|| a.exchange.cmp(&b.exchange))
                });
                report.mx_records = records;
            }
            Err(e) => report.lookup_errors.push(e.to_string()),
        }

        match txt {
            Ok(records) => {
                report.spf = records.into_iter().find(|r| r.starts_with("v=spf1"));
            }
            Err(e) => report.lookup_errors.push(e.to_string()),
        }

        match dmarc {
            Ok(records) => {
                report.dmarc = records.into_iter().find(|r| r.starts_with("v=DMARC1"));
                report.dmarc_policy = report.dmarc.as_deref().and_then(dmarc_policy);
            }
            Err(e) => report.lookup_errors.push(e.to_string()),
        }

        if report.lookup_errors.is_empty() {
            info!(
                domain = %report.domain,
                mx = report.mx_records.len(),
                spf = report.spf.is_some(),
                dmarc = report.dmarc.is_some(),
                "domain analysis complete"
            );
        } else {
            warn!(
                domain = %report.domain,
                failed = report.lookup_errors.len(),
                "domain analysis incomplete"
            );
        }

        report
    }

    async fn bounded<T>(
        &self,
        name: &str,
        lookup: impl std::future::Future<Output = Result<T, TransportError>>,
    ) -> Result<T, TransportError> {
        tokio::time::timeout(self.timeout, lookup)
            .await
            .unwrap_or_else(|_| {
                Err(TransportError::new(
                    TransportErrorKind::Timeout,
                    format!("{name}: no answer within {}ms", self.timeout.as_millis()),
                ))
            })
    }
}

impl std::fmt::Debug for DomainAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainAnalyzer")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// The `p=` tag of a DMARC record.
fn dmarc_policy(record: &str) -> Option<String> {
    record
        .split(';')
        .map(str::trim)
        .find_map(|tag| tag.strip_prefix("p="))
        .map(|policy| policy.trim().to_ascii_lowercase())
}
