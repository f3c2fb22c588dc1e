//! Certificate trust exceptions for `wss` connections.
//!
//! A resource can be created with a set of [`CertException`]s: certificate
//! validation failures it should tolerate. They map onto the two switches a
//! `native-tls` connector exposes.

// ============================================================================
// Imports
// ============================================================================

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tokio_tungstenite::Connector;
use tracing::warn;
use url::Url;

use crate::error::Result;

// ============================================================================
// CertException
// ============================================================================

/// A server certificate validation failure that may be ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CertException {
    /// Chain does not lead to a trusted root.
    Untrusted,
    /// Certificate is expired or not yet valid.
    Expired,
    /// Intermediate certificates are missing.
    IncompleteChain,
    /// Certificate is not valid for server authentication.
    WrongUsage,
    /// Host name does not match the certificate.
    InvalidName,
    /// Revocation status could not be determined.
    RevocationInformationMissing,
    /// Revocation server was unreachable.
    RevocationFailure,
}

impl CertException {
    /// Returns `true` if tolerating this failure requires disabling
    /// certificate verification (as opposed to host name verification).
    #[inline]
    #[must_use]
    pub const fn relaxes_certificate(self) -> bool {
        !matches!(self, Self::InvalidName)
    }
}

// ============================================================================
// Connector
// ============================================================================

/// Builds a TLS connector honoring `exceptions`.
///
/// Returns `None` (use the default connector) for `ws` URLs or when no
/// exception is configured.
///
/// # Errors
///
/// Returns [`Error::Tls`](crate::Error::Tls) if the platform TLS backend
/// cannot build a connector.
pub(crate) fn connector_for(
    url: &Url,
    exceptions: &FxHashSet<CertException>,
) -> Result<Option<Connector>> {
    if url.scheme() != "wss" || exceptions.is_empty() {
        return Ok(None);
    }

    let mut builder = native_tls::TlsConnector::builder();

    if exceptions.contains(&CertException::InvalidName) {
        builder.danger_accept_invalid_hostnames(true);
    }

    if exceptions.iter().any(|e| e.relaxes_certificate()) {
        builder.danger_accept_invalid_certs(true);
    }

    warn!(?exceptions, host = url.host_str(), "TLS verification relaxed");

    Ok(Some(Connector::NativeTls(builder.build()?)))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[CertException]) -> FxHashSet<CertException> {
        items.iter().copied().collect()
    }

    #[test]
    fn test_relaxes_certificate() {
        assert!(CertException::Untrusted.relaxes_certificate());
        assert!(CertException::Expired.relaxes_certificate());
        assert!(!CertException::InvalidName.relaxes_certificate());
    }

    #[test]
    fn test_plain_ws_uses_default_connector() {
        let url = Url::parse("ws://127.0.0.1:9000").unwrap();
        let connector = connector_for(&url, &set(&[CertException::Untrusted])).unwrap();
        assert!(connector.is_none());
    }

    #[test]
    fn test_no_exceptions_uses_default_connector() {
        let url = Url::parse("wss://example.com").unwrap();
        assert!(connector_for(&url, &FxHashSet::default()).unwrap().is_none());
    }

    #[test]
    fn test_wss_with_exceptions_builds_connector() {
        let url = Url::parse("wss://example.com").unwrap();
        let connector = connector_for(&url, &set(&[CertException::InvalidName])).unwrap();
        assert!(matches!(connector, Some(Connector::NativeTls(_))));
    }
}
