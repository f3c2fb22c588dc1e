//! Type-safe identifiers.
//!
//! Every resource carries a [`ResourceId`] so log lines from concurrent
//! resources sharing one process can be told apart.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// ResourceId
// ============================================================================

/// Unique identifier of a [`WebSocketResource`](crate::WebSocketResource).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(Uuid);

impl ResourceId {
    /// Generates a new random identifier.
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[inline]
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_unique() {
        assert_ne!(ResourceId::generate(), ResourceId::generate());
    }

    #[test]
    fn test_display_matches_uuid() {
        let id = ResourceId::generate();
        assert_eq!(id.to_string(), id.as_uuid().to_string());
    }
}
