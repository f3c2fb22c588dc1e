//! WebSocket close codes.
//!
//! Standard close-code integer space from RFC 6455 Section 7.4.1.
//! Codes outside the named set round-trip through [`CloseCode::Other`].

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// CloseCode
// ============================================================================

/// Status code sent with (or received in) a close frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u16", into = "u16")]
pub enum CloseCode {
    /// 1000: normal closure.
    Normal,
    /// 1001: endpoint is going away (also used when the resource is dropped).
    GoingAway,
    /// 1002: protocol error.
    ProtocolError,
    /// 1003: unsupported data type.
    Unsupported,
    /// 1005: no status code present. Never sent on the wire.
    NoStatus,
    /// 1006: connection dropped without a close frame. Never sent on the wire.
    Abnormal,
    /// 1007: payload inconsistent with message type.
    BadPayload,
    /// 1008: policy violation.
    PolicyViolation,
    /// 1009: message too large.
    TooLarge,
    /// 1010: client expected an extension the server did not negotiate.
    MandatoryExtension,
    /// 1011: unexpected server condition.
    InternalError,
    /// Any other code.
    Other(u16),
}

impl CloseCode {
    /// Returns the numeric code.
    #[inline]
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        match self {
            Self::Normal => 1000,
            Self::GoingAway => 1001,
            Self::ProtocolError => 1002,
            Self::Unsupported => 1003,
            Self::NoStatus => 1005,
            Self::Abnormal => 1006,
            Self::BadPayload => 1007,
            Self::PolicyViolation => 1008,
            Self::TooLarge => 1009,
            Self::MandatoryExtension => 1010,
            Self::InternalError => 1011,
            Self::Other(code) => code,
        }
    }

    /// Returns `true` if this code is reserved for local reporting and must
    /// not appear in an outgoing close frame.
    #[inline]
    #[must_use]
    pub const fn is_reserved(self) -> bool {
        matches!(self.as_u16(), 1004..=1006 | 1015)
    }

    /// Returns `true` if this code may be sent in a close frame.
    ///
    /// Allowed are the assigned codes 1000-1003 and 1007-1014 and the
    /// registered and private ranges 3000-4999.
    #[inline]
    #[must_use]
    pub const fn is_sendable(self) -> bool {
        matches!(self.as_u16(), 1000..=1003 | 1007..=1014 | 3000..=4999)
    }
}

impl From<u16> for CloseCode {
    fn from(code: u16) -> Self {
        match code {
            1000 => Self::Normal,
            1001 => Self::GoingAway,
            1002 => Self::ProtocolError,
            1003 => Self::Unsupported,
            1005 => Self::NoStatus,
            1006 => Self::Abnormal,
            1007 => Self::BadPayload,
            1008 => Self::PolicyViolation,
            1009 => Self::TooLarge,
            1010 => Self::MandatoryExtension,
            1011 => Self::InternalError,
            other => Self::Other(other),
        }
    }
}

impl From<CloseCode> for u16 {
    #[inline]
    fn from(code: CloseCode) -> Self {
        code.as_u16()
    }
}

impl fmt::Display for CloseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_codes() {
        assert_eq!(CloseCode::Normal.as_u16(), 1000);
        assert_eq!(CloseCode::GoingAway.as_u16(), 1001);
        assert_eq!(CloseCode::from(1011), CloseCode::InternalError);
    }

    #[test]
    fn test_other_code_preserved() {
        let code = CloseCode::from(4001);
        assert_eq!(code, CloseCode::Other(4001));
        assert_eq!(u16::from(code), 4001);
    }

    #[test]
    fn test_reserved_codes() {
        assert!(CloseCode::Abnormal.is_reserved());
        assert!(CloseCode::NoStatus.is_reserved());
        assert!(!CloseCode::Normal.is_reserved());
    }

    #[test]
    fn test_sendable_codes() {
        assert!(CloseCode::Normal.is_sendable());
        assert!(CloseCode::InternalError.is_sendable());
        assert!(CloseCode::Other(1012).is_sendable());
        assert!(CloseCode::Other(4999).is_sendable());

        assert!(!CloseCode::Abnormal.is_sendable());
        assert!(!CloseCode::Other(1015).is_sendable());
        assert!(!CloseCode::Other(0).is_sendable());
        assert!(!CloseCode::Other(999).is_sendable());
        assert!(!CloseCode::Other(1016).is_sendable());
        assert!(!CloseCode::Other(2999).is_sendable());
        assert!(!CloseCode::Other(5000).is_sendable());
    }
}
