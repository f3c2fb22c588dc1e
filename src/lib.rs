//! Asynchronous WebSocket client resource.
//!
//! A [`WebSocketResource`] is a single logical connection that accepts
//! connect, send, ping and close requests from any thread, applies them to
//! one underlying transport in a well-defined order, and reports every
//! outcome through single-slot handlers.
//!
//! # Guarantees
//!
//! - Writes reach the transport in the order they were requested, one at a
//!   time, and never before the connect attempt has concluded.
//! - Writes queued before a failed connect are dropped without `OnSend`.
//! - `close` is idempotent: exactly one `OnClose` (or close error) per resource.
//! - Dropping the handle runs the close sequence to completion first.
//! - Failures never surface from a public call; they arrive through `OnError`
//!   tagged with an [`ErrorKind`].
//!
//! # Quick Start
//!
//! ```no_run
//! use websocket_resource::{CloseCode, Result, WebSocketResource};
//!
//! fn main() -> Result<()> {
//!     let resource = WebSocketResource::new("wss://example.com/feed", [])?;
//!
//!     resource.on_connect(|| println!("open"));
//!     resource.on_send(|bytes| println!("sent {bytes} bytes"));
//!     resource.on_close(|code, reason| println!("closed {code}: {reason}"));
//!     resource.on_error(|error| eprintln!("{error}"));
//!
//!     // Requests may be issued before the connection is established.
//!     resource.send("subscribe");
//!     resource.connect(Vec::new(), []);
//!     resource.close(CloseCode::Normal, "done");
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`error`] | Error types, [`Result`] alias, [`ResourceError`] |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | Close codes, frames, base64 codec |
//! | [`resource`] | [`WebSocketResource`] and its configuration |
//! | [`transport`] | [`Transport`] seam and the tungstenite implementation |

// ============================================================================
// Modules
// ============================================================================

/// Error types and result aliases.
pub mod error;

/// Type-safe identifiers.
pub mod identifiers;

/// Close codes, frames and payload encoding.
pub mod protocol;

/// The WebSocket resource.
///
/// Use [`WebSocketResource::new`] or [`WebSocketResource::builder`].
pub mod resource;

/// Transport capability and default implementation.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Error types
pub use error::{Error, ErrorKind, ResourceError, Result};

// Identifier types
pub use identifiers::ResourceId;

// Protocol types
pub use protocol::{CloseCode, InboundFrame, OutgoingFrame};

// Resource types
pub use resource::{ReadyState, ResourceBuilder, ResourceOptions, WebSocketResource};

// Transport types
pub use transport::{
    CertException, ConnectRequest, InboundStream, Transport, TungsteniteTransport,
};
