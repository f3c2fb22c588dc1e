//! Transport capability driven by the resource.
//!
//! The resource never speaks the WebSocket wire protocol itself. It drives a
//! [`Transport`]: something that can connect, write one frame at a time,
//! close, and hand back a stream of inbound frames.
//!
//! # Ownership
//!
//! ```text
//! ┌──────────────────────┐   connect / send / close   ┌─────────────────┐
//! │ Lane actor (writer)  │───────────────────────────►│  Transport      │
//! └──────────────────────┘                            │                 │
//! ┌──────────────────────┐       InboundStream        │                 │
//! │ Reader task          │◄───────────────────────────│                 │
//! └──────────────────────┘                            └─────────────────┘
//! ```
//!
//! The lane owns the transport exclusively, so at most one write is ever in
//! flight. The inbound stream returned by [`Transport::connect`] is consumed
//! by a separate reader task.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `tls` | Certificate trust exceptions |
//! | `tungstenite` | Default transport over `tokio-tungstenite` |

// ============================================================================
// Submodules
// ============================================================================

/// Certificate trust exceptions for `wss` connections.
pub mod tls;

/// Default transport over `tokio-tungstenite`.
pub mod tungstenite;

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use rustc_hash::FxHashMap;
use url::Url;

use crate::error::Result;
use crate::protocol::{CloseCode, InboundFrame, OutgoingFrame};

// ============================================================================
// Re-exports
// ============================================================================

pub use tls::CertException;
pub use tungstenite::TungsteniteTransport;

// ============================================================================
// Types
// ============================================================================

/// Stream of inbound frames produced by a connected transport.
///
/// The stream ends when the underlying socket is gone.
pub type InboundStream = BoxStream<'static, Result<InboundFrame>>;

/// Everything needed to open a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectRequest {
    /// Target URL (`ws` or `wss`).
    pub url: Url,
    /// Requested subprotocols, sent as `Sec-WebSocket-Protocol`.
    pub protocols: Vec<String>,
    /// Extra handshake headers.
    pub headers: FxHashMap<String, String>,
}

// ============================================================================
// Transport
// ============================================================================

/// A connect/send/close primitive over a socket.
///
/// Implementations report failures as [`Error`](crate::Error); the resource
/// classifies them into the matching [`ErrorKind`](crate::ErrorKind).
#[async_trait]
pub trait Transport: Send + 'static {
    /// Opens the connection and returns the inbound half.
    async fn connect(&mut self, request: &ConnectRequest) -> Result<InboundStream>;

    /// Writes one frame and waits until it has been flushed.
    async fn send(&mut self, frame: OutgoingFrame) -> Result<()>;

    /// Sends a close frame with `code` and `reason`.
    ///
    /// Closing a transport that never connected is not an error.
    async fn close(&mut self, code: CloseCode, reason: &str) -> Result<()>;
}
