//! Probe execution: one HTTP exchange per (identifier, platform) pair.
//!
//! The network is reached through the [`Fetcher`] trait. [`HttpFetcher`] is
//! the reqwest implementation used in production; tests plug in stubs.
//! [`ProbeExecutor`] wraps a fetcher with the per-probe timeout and turns every
//! failure into data on [`RawOutcome`] instead of an error.

use crate::error::Result;
use crate::url_builder::{build_probe_request, ProbeRequest};
use async_trait::async_trait;
use gotcha_core::{Identifier, ScanningConfig};
use gotcha_platform::{HttpMethod, PlatformDefinition};
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Category of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportErrorKind {
    /// The probe did not finish within its timeout
    Timeout,
    /// Host name resolution failed
    Dns,
    /// The connection could not be established or was reset
    Connect,
    /// TLS handshake or certificate failure
    Tls,
    /// Redirect limit exceeded
    Redirect,
    /// The response body could not be read
    Body,
    /// The request could not be built or sent
    Request,
    /// The probe task itself failed
    Internal,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Timeout => "timeout",
            Self::Dns => "dns",
            Self::Connect => "connect",
            Self::Tls => "tls",
            Self::Redirect => "redirect",
            Self::Body => "body",
            Self::Request => "request",
            Self::Internal => "internal",
        };
        f.write_str(name)
    }
}

/// A captured transport failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportError {
    /// Failure category
    pub kind: TransportErrorKind,
    /// Human-readable description
    pub message: String,
}

impl TransportError {
    /// Create a transport error.
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// A timeout after `after`.
    #[must_use]
    pub fn timeout(after: Duration) -> Self {
        Self::new(
            TransportErrorKind::Timeout,
            format!("no response within {}ms", after.as_millis()),
        )
    }

    fn from_reqwest(error: &reqwest::Error) -> Self {
        let kind = if error.is_timeout() {
            TransportErrorKind::Timeout
        } else if error.is_redirect() {
            TransportErrorKind::Redirect
        } else if error.is_body() || error.is_decode() {
            TransportErrorKind::Body
        } else if error.is_builder() {
            TransportErrorKind::Request
        } else {
            classify_source_chain(error)
        };

        Self::new(kind, error_chain_message(error))
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// DNS and TLS failures are only visible in the lower-level causes. The
/// top-level message embeds the request URL and is left out.
fn classify_source_chain(error: &reqwest::Error) -> TransportErrorKind {
    let causes = error.source().map(error_chain_message).unwrap_or_default();
    kind_from_causes(error.is_connect(), &causes)
}

fn kind_from_causes(is_connect: bool, causes: &str) -> TransportErrorKind {
    let causes = causes.to_ascii_lowercase();

    if causes.contains("dns error") || causes.contains("failed to lookup address") {
        TransportErrorKind::Dns
    } else if causes.contains("certificate")
        || causes.contains("tls")
        || causes.contains("handshake")
    {
        TransportErrorKind::Tls
    } else if is_connect || causes.contains("connection") {
        TransportErrorKind::Connect
    } else {
        TransportErrorKind::Request
    }
}

fn error_chain_message(error: &(dyn StdError + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// A response as received from the network, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body, truncated to the configured limit
    pub body: String,
    /// URL after redirects
    pub final_url: String,
}

/// What one probe observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOutcome {
    /// HTTP status, absent when the request failed
    pub status: Option<u16>,
    /// Response body, truncated
    pub body: String,
    /// URL after redirects, when a response arrived
    pub final_url: Option<String>,
    /// Wall time spent on the probe
    pub elapsed: Duration,
    /// Set when the exchange failed
    pub error: Option<TransportError>,
}

impl RawOutcome {
    /// Outcome for a received response.
    #[must_use]
    pub fn response(response: FetchedResponse, elapsed: Duration) -> Self {
        Self {
            status: Some(response.status),
            body: response.body,
            final_url: Some(response.final_url),
            elapsed,
            error: None,
        }
    }

    /// Outcome for a failed exchange.
    #[must_use]
    pub fn failed(error: TransportError, elapsed: Duration) -> Self {
        Self {
            status: None,
            body: String::new(),
            final_url: None,
            elapsed,
            error: Some(error),
        }
    }
}

/// One HTTP exchange.
///
/// Implementations must not panic on network failures; every failure is
/// returned as a [`TransportError`].
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Perform `request`, giving up after `timeout`.
    async fn fetch(
        &self,
        request: &ProbeRequest,
        timeout: Duration,
    ) -> std::result::Result<FetchedResponse, TransportError>;
}

/// Reqwest-backed [`Fetcher`].
///
/// The client is built once and shared by every probe of every scan.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    max_body_bytes: usize,
}

impl HttpFetcher {
    /// Build a fetcher from the scanning settings.
    pub fn new(config: &ScanningConfig) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/json;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            reqwest::header::HeaderValue::from_static("en-US,en;q=0.5"),
        );

        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            max_body_bytes: config.max_body_bytes,
        })
    }

    async fn read_body(
        &self,
        mut response: reqwest::Response,
    ) -> std::result::Result<String, reqwest::Error> {
        let mut buffer = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            let room = self.max_body_bytes - buffer.len();
            if chunk.len() >= room {
                buffer.extend_from_slice(&chunk[..room]);
                break;
            }
            buffer.extend_from_slice(&chunk);
        }
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(
        &self,
        request: &ProbeRequest,
        timeout: Duration,
    ) -> std::result::Result<FetchedResponse, TransportError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Head => reqwest::Method::HEAD,
            HttpMethod::Post => reqwest::Method::POST,
        };

        let mut builder = self
            .client
            .request(method, &request.url)
            .timeout(timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(&e))?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let body = self
            .read_body(response)
            .await
            .map_err(|e| TransportError::from_reqwest(&e))?;

        Ok(FetchedResponse {
            status,
            body,
            final_url,
        })
    }
}

/// Runs single probes against a shared [`Fetcher`].
#[derive(Clone)]
pub struct ProbeExecutor {
    fetcher: Arc<dyn Fetcher>,
}

impl ProbeExecutor {
    /// Create an executor over any fetcher.
    #[must_use]
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    /// Create an executor backed by a reqwest client built from `config`.
    pub fn http(config: &ScanningConfig) -> Result<Self> {
        Ok(Self::new(Arc::new(HttpFetcher::new(config)?)))
    }

    /// Probe one platform for one identifier.
    ///
    /// Always returns within `timeout` (plus scheduling slack) and never fails:
    /// transport faults are recorded in [`RawOutcome::error`].
    pub async fn probe(
        &self,
        identifier: &Identifier,
        platform: &PlatformDefinition,
        timeout: Duration,
    ) -> RawOutcome {
        let request = build_probe_request(platform, identifier);
        trace!(platform = %platform.id(), url = %request.url, "probing");

        let started = Instant::now();
        let result = tokio::time::timeout(timeout, self.fetcher.fetch(&request, timeout)).await;
        let elapsed = started.elapsed();

        let outcome = match result {
            Ok(Ok(response)) => RawOutcome::response(response, elapsed),
            Ok(Err(error)) => RawOutcome::failed(error, elapsed),
            Err(_) => RawOutcome::failed(TransportError::timeout(timeout), elapsed),
        };

        debug!(
            platform = %platform.id(),
            status = ?outcome.status,
            error = ?outcome.error.as_ref().map(|e| e.kind),
            elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            "probe finished"
        );

        outcome
    }
}

impl fmt::Debug for ProbeExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbeExecutor").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gotcha_core::{Category, IdentifierKind, PlatformId};
    use gotcha_platform::{DetectionRule, RequestSpec};
    use std::sync::Mutex;

    struct RecordingFetcher {
        delay: Duration,
        seen: Mutex<Vec<ProbeRequest>>,
    }

    #[async_trait]
    impl Fetcher for RecordingFetcher {
        async fn fetch(
            &self,
            request: &ProbeRequest,
            _timeout: Duration,
        ) -> std::result::Result<FetchedResponse, TransportError> {
            self.seen.lock().expect("lock").push(request.clone());
            tokio::time::sleep(self.delay).await;
            Ok(FetchedResponse {
                status: 200,
                body: "ok".to_string(),
                final_url: request.url.clone(),
            })
        }
    }

    fn platform() -> PlatformDefinition {
        PlatformDefinition {
            id: PlatformId::new("test").expect("valid platform ID"),
            name: "Test".to_string(),
            category: Category::General,
            url: "https://test.example/{username}".to_string(),
            profile_url: None,
            accepts: IdentifierKind::Username,
            rule: DetectionRule::status_default(),
            request: RequestSpec::default(),
            adult: false,
            notes: String::new(),
        }
    }

    #[tokio::test]
    async fn test_probe_records_response() {
        let fetcher = Arc::new(RecordingFetcher {
            delay: Duration::ZERO,
            seen: Mutex::new(Vec::new()),
        });
        let executor = ProbeExecutor::new(fetcher.clone());
        let id = Identifier::username("alice").expect("valid username");

        let outcome = executor
            .probe(&id, &platform(), Duration::from_secs(1))
            .await;

        assert_eq!(outcome.status, Some(200));
        assert!(outcome.error.is_none());
        assert_eq!(
            fetcher.seen.lock().expect("lock")[0].url,
            "https://test.example/alice"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_timeout_is_captured() {
        let fetcher = Arc::new(RecordingFetcher {
            delay: Duration::from_secs(30),
            seen: Mutex::new(Vec::new()),
        });
        let executor = ProbeExecutor::new(fetcher);
        let id = Identifier::username("alice").expect("valid username");

        let outcome = executor
            .probe(&id, &platform(), Duration::from_millis(100))
            .await;

        assert_eq!(outcome.status, None);
        let error = outcome.error.expect("timeout recorded");
        assert_eq!(error.kind, TransportErrorKind::Timeout);
    }

    #[test]
    fn test_http_fetcher_builds_from_default_config() {
        assert!(HttpFetcher::new(&ScanningConfig::default()).is_ok());
    }

    fn probe_request(url: String) -> ProbeRequest {
        ProbeRequest {
            method: HttpMethod::Get,
            url,
            headers: std::collections::BTreeMap::new(),
            body: None,
        }
    }

    #[tokio::test]
    async fn test_http_fetcher_truncates_large_bodies() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind listener");
        let addr = listener.local_addr().expect("listener address");

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request).await;

            let body = "a".repeat(64 * 1024);
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            // The client hangs up once it has enough.
            let _ = socket.write_all(response.as_bytes()).await;
        });

        let config = ScanningConfig {
            max_body_bytes: 1024,
            ..ScanningConfig::default()
        };
        let fetcher = HttpFetcher::new(&config).expect("build fetcher");

        let response = fetcher
            .fetch(&probe_request(format!("http://{addr}/alice")), Duration::from_secs(5))
            .await
            .expect("response");

        assert_eq!(response.status, 200);
        assert_eq!(response.body.len(), 1024);
        assert!(response.body.bytes().all(|b| b == b'a'));
        server.abort();
    }

    #[tokio::test]
    async fn test_refused_connection_is_connect_error() {
        let fetcher = HttpFetcher::new(&ScanningConfig::default()).expect("build fetcher");

        let error = fetcher
            .fetch(
                &probe_request("http://127.0.0.1:1/tls-user".to_string()),
                Duration::from_secs(5),
            )
            .await
            .expect_err("nothing listens on port 1");

        assert_eq!(error.kind, TransportErrorKind::Connect);
    }

    #[tokio::test]
    async fn test_unresolvable_host_is_dns_error() {
        let fetcher = HttpFetcher::new(&ScanningConfig::default()).expect("build fetcher");

        let error = fetcher
            .fetch(
                &probe_request("http://nonexistent-host.invalid/alice".to_string()),
                Duration::from_secs(10),
            )
            .await
            .expect_err(".invalid never resolves");

        assert_eq!(error.kind, TransportErrorKind::Dns);
    }

    #[test]
    fn test_kind_from_causes_ignores_request_url() {
        // Only causes are inspected; a URL mentioning tls cannot leak in.
        assert_eq!(
            kind_from_causes(true, "client error (Connect): tcp connect error: Connection refused"),
            TransportErrorKind::Connect
        );
        assert_eq!(
            kind_from_causes(true, "dns error: failed to lookup address information"),
            TransportErrorKind::Dns
        );
        assert_eq!(
            kind_from_causes(true, "invalid peer certificate: UnknownIssuer"),
            TransportErrorKind::Tls
        );
        assert_eq!(kind_from_causes(false, ""), TransportErrorKind::Request);
    }

    #[test]
    fn test_transport_error_display() {
        let error = TransportError::timeout(Duration::from_millis(1500));
        assert_eq!(error.to_string(), "timeout: no response within 1500ms");
    }
}
