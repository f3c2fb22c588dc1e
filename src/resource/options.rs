//! Resource configuration.
//!
//! Controls the private runtime the resource runs its lane on and the
//! optional per-step timeouts. With the defaults no step is ever timed out:
//! a stalled transport stalls only its own step.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use websocket_resource::ResourceOptions;
//!
//! let options = ResourceOptions::new()
//!     .with_connect_timeout(Duration::from_secs(10))
//!     .with_write_timeout(Duration::from_secs(5));
//!
//! assert!(options.validate().is_ok());
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default number of worker threads in the resource runtime.
pub const DEFAULT_WORKER_THREADS: usize = 2;

// ============================================================================
// ResourceOptions
// ============================================================================

/// Runtime and timeout configuration for a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceOptions {
    /// Worker threads of the private tokio runtime.
    pub worker_threads: usize,

    /// Upper bound on the connect attempt.
    pub connect_timeout: Option<Duration>,

    /// Upper bound on each send or ping write.
    pub write_timeout: Option<Duration>,

    /// Upper bound on the transport close.
    pub close_timeout: Option<Duration>,
}

impl Default for ResourceOptions {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl ResourceOptions {
    /// Creates options with default settings.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            worker_threads: DEFAULT_WORKER_THREADS,
            connect_timeout: None,
            write_timeout: None,
            close_timeout: None,
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl ResourceOptions {
    /// Sets the runtime worker thread count.
    #[inline]
    #[must_use]
    pub fn with_worker_threads(mut self, count: usize) -> Self {
        self.worker_threads = count;
        self
    }

    /// Sets the connect timeout.
    #[inline]
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the per-write timeout (sends and pings).
    #[inline]
    #[must_use]
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = Some(timeout);
        self
    }

    /// Sets the transport close timeout.
    #[inline]
    #[must_use]
    pub fn with_close_timeout(mut self, timeout: Duration) -> Self {
        self.close_timeout = Some(timeout);
        self
    }
}

// ============================================================================
// Validation
// ============================================================================

impl ResourceOptions {
    /// Validates the options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `worker_threads` is zero or any timeout
    /// is zero.
    pub fn validate(&self) -> Result<()> {
        if self.worker_threads == 0 {
            return Err(Error::config("worker_threads must be greater than zero"));
        }

        let timeouts = [
            ("connect_timeout", self.connect_timeout),
            ("write_timeout", self.write_timeout),
            ("close_timeout", self.close_timeout),
        ];

        for (name, timeout) in timeouts {
            if timeout.is_some_and(|t| t.is_zero()) {
                return Err(Error::config(format!("{name} must be greater than zero")));
            }
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
