//! Base64 payload codec.
//!
//! Binary payloads cross the public API as base64 text: outgoing payloads
//! are decoded to raw bytes right before the transport write, inbound
//! binary frames are encoded before reaching `OnMessage`.

// ============================================================================
// Imports
// ============================================================================

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{Error, Result};

// ============================================================================
// Codec
// ============================================================================

/// Decodes a base64 payload into raw bytes.
///
/// # Errors
///
/// Returns [`Error::Encoding`] if `payload` is not valid standard base64.
pub fn decode_binary(payload: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(payload)
        .map_err(|e| Error::encoding(format!("invalid base64 payload: {e}")))
}

/// Encodes raw bytes as base64.
#[inline]
#[must_use]
pub fn encode_binary(data: &[u8]) -> String {
    STANDARD.encode(data)
}

// ============================================================================
// Tests
// ============================================================================
