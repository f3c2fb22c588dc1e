//! Error types for the WebSocket resource.
//!
//! Two layers of errors live here:
//!
//! - [`enum@Error`] is returned by the few fallible *synchronous* calls
//!   (construction, option validation) and produced internally by the
//!   transport while a step of the lane runs.
//! - [`ResourceError`] is what callers actually observe for I/O failures.
//!   Every transport failure is caught at the boundary of its asynchronous
//!   step, tagged with an [`ErrorKind`] and delivered through the `OnError`
//!   slot. Public operations never return it.
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`], [`Error::InvalidUrl`] |
//! | Connection | [`Error::Connection`], [`Error::ConnectionClosed`], [`Error::Timeout`] |
//! | Payload | [`Error::Encoding`], [`Error::InvalidHeader`] |
//! | External | [`Error::Io`], [`Error::Tls`], [`Error::WebSocket`] |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::io::Error as IoError;
use std::result::Result as StdResult;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when resource options are invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// The target URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// WebSocket connection failed or the transport refused an operation.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// The transport has no open connection to operate on.
    #[error("Connection closed")]
    ConnectionClosed,

    /// A transport step exceeded its configured timeout.
    #[error("Timeout after {timeout_ms}ms: {operation}")]
    Timeout {
        /// The step that timed out (`connect`, `send`, `ping`, `close`).
        operation: String,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // Payload Errors
    // ========================================================================
    /// A binary payload was not valid base64.
    #[error("Encoding error: {message}")]
    Encoding {
        /// Description of the decoding failure.
        message: String,
    },

    /// A caller supplied header or subprotocol could not be encoded.
    #[error("Invalid header {name}: {message}")]
    InvalidHeader {
        /// Header name as supplied.
        name: String,
        /// Why it was rejected.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// TLS connector error.
    #[error("TLS error: {0}")]
    Tls(#[from] native_tls::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a timeout error.
    #[inline]
    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }

    /// Creates an encoding error.
    #[inline]
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }

    /// Creates an invalid header error.
    #[inline]
    pub fn invalid_header(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            name: name.into(),
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::ConnectionClosed | Self::Tls(_) | Self::WebSocket(_)
        )
    }
}

// ============================================================================
// ErrorKind
// ============================================================================

/// The asynchronous step an error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The connect attempt failed.
    Connection,
    /// Writing a ping failed.
    Ping,
    /// Writing a text or binary message failed.
    Send,
    /// Reading an inbound message failed.
    Receive,
    /// Closing the transport failed.
    Close,
    /// A binary payload handed to `send_binary` was not valid base64.
    Encoding,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Connection => "connection",
            Self::Ping => "ping",
            Self::Send => "send",
            Self::Receive => "receive",
            Self::Close => "close",
            Self::Encoding => "encoding",
        };
        f.write_str(name)
    }
}

// ============================================================================
// ResourceError
// ============================================================================

/// Error value delivered to the `OnError` handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceError {
    /// Human-readable description.
    pub message: String,
    /// Step the failure happened in.
    pub kind: ErrorKind,
}

impl ResourceError {
    /// Creates a resource error from a message.
    #[inline]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    /// Classifies a crate error under `kind`.
    #[inline]
    #[must_use]
    pub fn from_error(kind: ErrorKind, error: &Error) -> Self {
        Self::new(kind, error.to_string())
    }
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.kind, self.message)
    }
}

impl std::error::Error for ResourceError {}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::ErrorKind as IoErrorKind;

    #[test]
    fn test_error_display() {
        let err = Error::connection("failed to connect");
        assert_eq!(err.to_string(), "Connection failed: failed to connect");
    }

    #[test]
    fn test_config_error() {
        let err = Error::config("worker_threads must be > 0");
        assert_eq!(
            err.to_string(),
            "Configuration error: worker_threads must be > 0"
        );
    }

    #[test]
    fn test_timeout_display_and_predicate() {
        let err = Error::timeout("connect", 1500);
        assert_eq!(err.to_string(), "Timeout after 1500ms: connect");
        assert!(err.is_timeout());
        assert!(!Error::ConnectionClosed.is_timeout());
    }

    #[test]
    fn test_is_connection_error() {
        assert!(Error::connection("test").is_connection_error());
        assert!(Error::ConnectionClosed.is_connection_error());
        assert!(!Error::encoding("bad").is_connection_error());
        assert!(!Error::config("bad").is_connection_error());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = IoError::new(IoErrorKind::ConnectionRefused, "refused");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_from_url_error() {
        let err: Error = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[test]
    fn test_resource_error_from_error() {
        let err = ResourceError::from_error(ErrorKind::Encoding, &Error::encoding("bad byte"));
        assert_eq!(err.kind, ErrorKind::Encoding);
        assert_eq!(err.message, "Encoding error: bad byte");
        assert_eq!(err.to_string(), "encoding error: Encoding error: bad byte");
    }
}
