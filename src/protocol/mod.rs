//! Payload and control types shared by the resource and its transport.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `close` | [`CloseCode`] |
//! | `encoding` | Base64 codec for binary payloads |
//! | `frame` | [`OutgoingFrame`] and [`InboundFrame`] |

// ============================================================================
// Submodules
// ============================================================================

/// Standard WebSocket close codes.
pub mod close;

/// Base64 codec for binary payloads.
pub mod encoding;

/// Frames crossing the transport boundary.
pub mod frame;

// ============================================================================
// Re-exports
// ============================================================================

pub use close::CloseCode;
pub use encoding::{decode_binary, encode_binary};
pub use frame::{InboundFrame, OutgoingFrame};
