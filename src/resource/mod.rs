//! The WebSocket client resource.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`WebSocketResource`] | Public handle: operations, handler registration, drop-time close |
//! | [`ResourceBuilder`] | Fluent configuration builder |
//! | [`ResourceOptions`] | Runtime size and per-step timeouts |
//! | [`ReadyState`] | Connection phase |
//!
//! # Control Flow
//!
//! ```text
//! caller ──► WebSocketResource ──mpsc──► Lane (owns Transport + FIFO)
//!                 │                         │
//!                 │ state / barriers        │ connect, write, ping, close
//!                 ▼                         ▼
//!            ResourceInner ◄──────── handler slots ◄── reader task
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder.
pub mod builder;

/// Handler slot types.
pub mod callbacks;

/// Public handle and shared state.
pub mod core;

/// Runtime and timeout options.
pub mod options;

/// Ready state machine.
pub mod state;

mod lane;
mod signal;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::ResourceBuilder;
pub use callbacks::{
    CloseHandler, ConnectHandler, ErrorHandler, MessageHandler, PingHandler, SendHandler,
};
pub use core::WebSocketResource;
pub use options::{DEFAULT_WORKER_THREADS, ResourceOptions};
pub use state::ReadyState;
