//! Concurrent TLS certificate expiry checking.
//!
//! The crate probes a batch of domains in parallel, tracks each probe's
//! lifecycle in a shared registry, animates progress on the terminal while
//! probes are in flight, and classifies the finished results into health
//! buckets for the final report.
//!
//! This module holds the leaf of the whole pipeline: the certificate prober.
//! One call, one handshake, one result. The prober reads the "not valid
//! after" field of whatever leaf certificate the server presents — it does
//! not validate the chain, the hostname, or revocation status.

use chrono::{NaiveDate, NaiveDateTime, Utc};
use openssl::ssl::{Ssl, SslContext, SslMethod, SslVerifyMode};
use serde::{Deserialize, Serialize};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

pub mod config;
pub mod display;
pub mod error;
pub mod metrics;
pub mod pool;
pub mod registry;
pub mod report;

pub use error::ProbeError;

/// Connect/read timeout applied to every probe.
const TIMEOUT: Duration = Duration::from_secs(10);

/// Default TLS port.
pub const DEFAULT_PORT: u16 = 443;

/// Default number of concurrent workers.
pub const DEFAULT_WORKERS: usize = 10;

/// Default expiring-soon threshold in days.
pub const DEFAULT_THRESHOLD: i64 = 15;

/// Outcome of probing one domain's certificate.
///
/// Exactly one side is populated: either `expiry_date` + `days_remaining`
/// (successful handshake and parse) or `error` (anything else). Failures are
/// values here, not control flow — the prober never panics or returns `Err`
/// across the pool boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeResult {
    pub domain: String,
    pub expiry_date: Option<NaiveDate>,
    pub days_remaining: Option<i64>,
    pub error: Option<String>,
}

impl ProbeResult {
    /// A successful probe outcome.
    pub fn ok(domain: impl Into<String>, expiry_date: NaiveDate, days_remaining: i64) -> Self {
        ProbeResult {
            domain: domain.into(),
            expiry_date: Some(expiry_date),
            days_remaining: Some(days_remaining),
            error: None,
        }
    }

    /// A failed probe outcome.
    pub fn failed(domain: impl Into<String>, error: impl Into<String>) -> Self {
        ProbeResult {
            domain: domain.into(),
            expiry_date: None,
            days_remaining: None,
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Probes `domain:port` and reports the leaf certificate's expiry.
///
/// Performs DNS resolution, a TCP connect with timeout, and a TLS handshake
/// with verification disabled (we want the expiry date even from certificates
/// a verifying client would reject). Any failure along the way is folded into
/// the returned result's `error` field.
pub fn probe(domain: &str, port: u16) -> ProbeResult {
    match fetch_expiry(domain, port) {
        Ok(expiry_date) => {
            let today = Utc::now().date_naive();
            ProbeResult::ok(domain, expiry_date, days_until(expiry_date, today))
        }
        Err(e) => ProbeResult::failed(domain, e.to_string()),
    }
}

/// Whole calendar days from `today` until `expiry`; negative once expired.
///
/// Time-of-day is already discarded by the time we get here — both sides are
/// plain dates.
pub fn days_until(expiry: NaiveDate, today: NaiveDate) -> i64 {
    expiry.signed_duration_since(today).num_days()
}

fn fetch_expiry(domain: &str, port: u16) -> Result<NaiveDate, ProbeError> {
    let mut context = SslContext::builder(SslMethod::tls())?;
    context.set_verify(SslVerifyMode::NONE);
    let context = context.build();

    let mut connector = Ssl::new(&context)?;
    connector.set_hostname(domain)?;

    let remote = format!("{}:{}", domain, port);
    let socket_addr = remote
        .to_socket_addrs()
        .map_err(|e| ProbeError::DnsResolution {
            hostname: domain.to_string(),
            source: e,
        })?
        .next()
        .ok_or_else(|| ProbeError::DnsResolution {
            hostname: domain.to_string(),
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "hostname resolved to no addresses",
            ),
        })?;

    let tcp_stream = TcpStream::connect_timeout(&socket_addr, TIMEOUT).map_err(|e| {
        ProbeError::ConnectionFailed {
            address: remote.clone(),
            source: e,
        }
    })?;
    tcp_stream
        .set_read_timeout(Some(TIMEOUT))
        .map_err(|e| ProbeError::ConnectionFailed {
            address: remote.clone(),
            source: e,
        })?;
    tcp_stream
        .set_write_timeout(Some(TIMEOUT))
        .map_err(|e| ProbeError::ConnectionFailed {
            address: remote.clone(),
            source: e,
        })?;

    let stream = connector.connect(tcp_stream)?;

    let x509 = stream
        .ssl()
        .peer_certificate()
        .ok_or_else(|| ProbeError::CertificateError {
            reason: "server presented no certificate".to_string(),
        })?;

    parse_not_after(&x509.not_after().to_string())
}

/// Parses OpenSSL's notAfter display form, e.g. `Jun  4 12:00:00 2026 GMT`,
/// down to its date component.
fn parse_not_after(raw: &str) -> Result<NaiveDate, ProbeError> {
    NaiveDateTime::parse_from_str(raw.trim(), "%b %e %H:%M:%S %Y GMT")
        .map(|dt| dt.date())
        .map_err(|_| ProbeError::CertificateError {
            reason: format!("unparseable notAfter timestamp: {}", raw),
        })
}
