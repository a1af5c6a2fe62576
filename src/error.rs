//! Error types for certificate probing.
//!
//! This module defines the errors that can occur while connecting to a host
//! and reading its certificate's expiry date. All of them collapse into the
//! single error string carried by a `ProbeResult` — the caller never has to
//! distinguish them, but the messages should tell a human what went wrong.

use std::fmt;
use std::io;

/// Error type for a failed certificate probe.
///
/// Covers everything between "resolve the hostname" and "parse the
/// certificate's notAfter field". Probe failures never propagate as panics;
/// they are converted to a message and attached to the probe's result.
#[derive(Debug)]
pub enum ProbeError {
    /// DNS resolution failed for the given hostname
    DnsResolution {
        /// The hostname that failed to resolve
        hostname: String,
        /// The underlying I/O error
        source: io::Error,
    },

    /// TCP connection failed to the target address
    ConnectionFailed {
        /// The address (host:port) that connection failed to
        address: String,
        /// The underlying I/O error
        source: io::Error,
    },

    /// TLS handshake failed
    HandshakeFailed {
        /// Details about why the handshake failed
        details: String,
    },

    /// Certificate was missing or its expiry field could not be parsed
    CertificateError {
        /// Description of what went wrong
        reason: String,
    },

    /// OpenSSL error occurred
    OpenSsl {
        /// The underlying OpenSSL error
        details: String,
    },
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DnsResolution { hostname, .. } => {
                write!(
                    f,
                    "Failed to resolve hostname: {}. Check that the hostname is spelled correctly and your DNS configuration is working.",
                    hostname
                )
            }
            Self::ConnectionFailed { address, source } => {
                write!(f, "Connection failed to {}: {}", address, source)
            }
            Self::HandshakeFailed { details } => {
                write!(f, "TLS handshake failed: {}", details)
            }
            Self::CertificateError { reason } => {
                write!(f, "Certificate error: {}", reason)
            }
            Self::OpenSsl { details } => {
                write!(f, "OpenSSL error: {}", details)
            }
        }
    }
}

impl std::error::Error for ProbeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DnsResolution { source, .. } => Some(source),
            Self::ConnectionFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<openssl::error::ErrorStack> for ProbeError {
    fn from(e: openssl::error::ErrorStack) -> Self {
        Self::OpenSsl {
            details: e.to_string(),
        }
    }
}

impl<S: std::fmt::Debug> From<openssl::ssl::HandshakeError<S>> for ProbeError {
    fn from(e: openssl::ssl::HandshakeError<S>) -> Self {
        Self::HandshakeFailed {
            details: format!("{}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProbeError::CertificateError {
            reason: "server presented no certificate".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Certificate error: server presented no certificate"
        );
    }

    #[test]
    fn test_dns_error_keeps_hostname() {
        let err = ProbeError::DnsResolution {
            hostname: "nosuch.example".to_string(),
            source: io::Error::new(io::ErrorKind::Other, "lookup failed"),
        };
        assert!(err.to_string().contains("nosuch.example"));
    }

    #[test]
    fn test_connection_error_has_source() {
        use std::error::Error;

        let err = ProbeError::ConnectionFailed {
            address: "127.0.0.1:1".to_string(),
            source: io::Error::new(io::ErrorKind::ConnectionRefused, "refused"),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("127.0.0.1:1"));
    }
}
