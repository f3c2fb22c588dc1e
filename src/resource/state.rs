//! Connection state machine.
//!
//! ```text
//! Connecting ──► Open ──► Closing ──► Closed
//!      │                     ▲
//!      └─────────────────────┘
//! ```
//!
//! `Connecting → Open` is the only success edge. Any live state may enter
//! `Closing`, and `Closed` is terminal. All transitions are single atomic
//! operations, so readers never block and concurrent close requests cannot
//! both be accepted.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

// ============================================================================
// ReadyState
// ============================================================================

/// Externally observable connection phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ReadyState {
    /// Connect has not concluded (or was never requested).
    Connecting = 0,
    /// Connected; writes reach the transport.
    Open = 1,
    /// A close sequence has been accepted and is running.
    Closing = 2,
    /// Terminal.
    Closed = 3,
}

impl ReadyState {
    /// Decodes the atomic representation.
    #[inline]
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Connecting,
            1 => Self::Open,
            2 => Self::Closing,
            _ => Self::Closed,
        }
    }

    /// Returns `true` for `Closing` and `Closed`.
    #[inline]
    #[must_use]
    pub const fn is_closing_or_closed(self) -> bool {
        matches!(self, Self::Closing | Self::Closed)
    }
}

impl fmt::Display for ReadyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closing => "closing",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

// ============================================================================
// StateCell
// ============================================================================

/// Lock-free holder of the resource-wide [`ReadyState`].
#[derive(Debug)]
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    /// Creates a cell in [`ReadyState::Connecting`].
    pub(crate) const fn new() -> Self {
        Self(AtomicU8::new(ReadyState::Connecting as u8))
    }

    /// Returns the current state.
    #[inline]
    pub(crate) fn get(&self) -> ReadyState {
        ReadyState::from_u8(self.0.load(Ordering::SeqCst))
    }

    /// `Connecting → Open`. Fails if a close was accepted meanwhile.
    pub(crate) fn open(&self) -> bool {
        self.transition(ReadyState::Connecting, ReadyState::Open)
    }

    /// Accepts a close request.
    ///
    /// Returns the state the resource was in, or `None` if it was already
    /// `Closing` or `Closed`.
    pub(crate) fn begin_closing(&self) -> Option<ReadyState> {
        self.0
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                match ReadyState::from_u8(current) {
                    ReadyState::Connecting | ReadyState::Open => Some(ReadyState::Closing as u8),
                    ReadyState::Closing | ReadyState::Closed => None,
                }
            })
            .ok()
            .map(ReadyState::from_u8)
    }

    /// `Open → Closing`, used when the peer initiates the close.
    pub(crate) fn begin_remote_closing(&self) -> bool {
        self.transition(ReadyState::Open, ReadyState::Closing)
    }

    /// Moves to the terminal state.
    pub(crate) fn mark_closed(&self) {
        self.0.store(ReadyState::Closed as u8, Ordering::SeqCst);
    }

    fn transition(&self, from: ReadyState, to: ReadyState) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

// ============================================================================
// Tests
// ============================================================================
