//! Frames exchanged with the transport.
//!
//! Framing, masking and the handshake belong to the transport; these types
//! only describe *what* crosses the boundary.

// ============================================================================
// Imports
// ============================================================================

use super::CloseCode;

// ============================================================================
// OutgoingFrame
// ============================================================================

/// A frame the lane hands to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutgoingFrame {
    /// UTF-8 text message.
    Text(String),
    /// Raw binary message (already decoded from base64).
    Binary(Vec<u8>),
    /// Ping control frame.
    Ping(Vec<u8>),
}

impl OutgoingFrame {
    /// Returns the payload length in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Text(text) => text.len(),
            Self::Binary(data) | Self::Ping(data) => data.len(),
        }
    }

    /// Returns `true` if the payload is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// InboundFrame
// ============================================================================

/// A frame read from the transport.
///
/// Control frames other than close are answered by the transport itself
/// and never surface here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    /// UTF-8 text message.
    Text(String),
    /// Raw binary message.
    Binary(Vec<u8>),
    /// The peer sent a close frame.
    Close {
        /// Code from the frame, [`CloseCode::NoStatus`] when absent.
        code: CloseCode,
        /// Reason from the frame, empty when absent.
        reason: String,
    },
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outgoing_len() {
        assert_eq!(OutgoingFrame::Text("ping-payload".into()).len(), 12);
        assert_eq!(OutgoingFrame::Binary(vec![1, 2, 3]).len(), 3);
        assert!(OutgoingFrame::Ping(Vec::new()).is_empty());
    }
}
