//! Builder pattern for resource configuration.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use websocket_resource::{CertException, WebSocketResource};
//!
//! # fn example() -> websocket_resource::Result<()> {
//! let resource = WebSocketResource::builder("wss://localhost:8443/socket")
//!     .trust(CertException::Untrusted)
//!     .connect_timeout(Duration::from_secs(10))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

use rustc_hash::FxHashSet;
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};
use crate::transport::{CertException, Transport, TungsteniteTransport};

use super::core::WebSocketResource;
use super::options::ResourceOptions;

// ============================================================================
// ResourceBuilder
// ============================================================================

/// Builder for a [`WebSocketResource`].
///
/// Use [`WebSocketResource::builder()`] to create one.
#[must_use]
pub struct ResourceBuilder {
    /// Target URL, parsed on build.
    url: String,
    /// Certificate failures to tolerate.
    trust: FxHashSet<CertException>,
    /// Runtime and timeout options.
    options: ResourceOptions,
    /// Custom transport; the tungstenite transport when unset.
    transport: Option<Box<dyn Transport>>,
}

impl fmt::Debug for ResourceBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceBuilder")
            .field("url", &self.url)
            .field("trust", &self.trust)
            .field("options", &self.options)
            .field("custom_transport", &self.transport.is_some())
            .finish()
    }
}

// ============================================================================
// ResourceBuilder Implementation
// ============================================================================

impl ResourceBuilder {
    /// Creates a builder for `url` with default options.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            trust: FxHashSet::default(),
            options: ResourceOptions::default(),
            transport: None,
        }
    }

    /// Tolerates one certificate failure on `wss` connections.
    pub fn trust(mut self, exception: CertException) -> Self {
        self.trust.insert(exception);
        self
    }

    /// Tolerates several certificate failures on `wss` connections.
    pub fn trust_all(mut self, exceptions: impl IntoIterator<Item = CertException>) -> Self {
        self.trust.extend(exceptions);
        self
    }

    /// Replaces all options.
    pub fn options(mut self, options: ResourceOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the worker thread count of the private runtime.
    pub fn worker_threads(mut self, count: usize) -> Self {
        self.options.worker_threads = count;
        self
    }

    /// Bounds the connect attempt.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.options.connect_timeout = Some(timeout);
        self
    }

    /// Bounds every send and ping write.
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.options.write_timeout = Some(timeout);
        self
    }

    /// Bounds the transport close.
    pub fn close_timeout(mut self, timeout: Duration) -> Self {
        self.options.close_timeout = Some(timeout);
        self
    }

    /// Uses `transport` instead of the default tungstenite transport.
    ///
    /// Trust exceptions only configure the default transport.
    pub fn transport(mut self, transport: impl Transport) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    /// Builds the resource and starts its lane.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidUrl`] if the URL does not parse
    /// - [`Error::Config`] if the scheme is not `ws`/`wss` or options are invalid
    /// - [`Error::Io`] if the runtime cannot be started
    pub fn build(self) -> Result<WebSocketResource> {
        let url = self.validate_url()?;
        self.options.validate()?;

        let transport = match self.transport {
            Some(transport) => {
                if !self.trust.is_empty() {
                    debug!("Trust exceptions ignored by custom transport");
                }
                transport
            }
            None => Box::new(TungsteniteTransport::with_trust(self.trust)),
        };

        WebSocketResource::start(url, self.options, transport)
    }

    fn validate_url(&self) -> Result<Url> {
        let url = Url::parse(&self.url)?;

        match url.scheme() {
            "ws" | "wss" => Ok(url),
            other => Err(Error::config(format!(
                "unsupported URL scheme '{other}', expected ws or wss"
            ))),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
