//! The WebSocket resource handle.
//!
//! Every public operation is a plain method callable from any thread. It
//! records what it must synchronously (state, close request) and hands the
//! rest to the lane, returning immediately. Outcomes are reported only
//! through the handler slots.
//!
//! # Lifecycle
//!
//! ```text
//! new ──► connect ──► send / send_binary / ping ... ──► close ──► drop
//!                                                        │
//!                  drop without close ── close(GoingAway, "Disposed")
//! ```
//!
//! Dropping the handle blocks until the close sequence has completed, so no
//! asynchronous work outlives the resource.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use tokio::runtime::{Builder, Runtime};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ResourceError, Result};
use crate::identifiers::ResourceId;
use crate::protocol::CloseCode;
use crate::transport::{CertException, ConnectRequest, Transport};

use super::builder::ResourceBuilder;
use super::callbacks::CallbackRegistry;
use super::lane::{Lane, LaneCommand, LaneOp, PendingWrite};
use super::options::ResourceOptions;
use super::signal::Signal;
use super::state::{ReadyState, StateCell};

// ============================================================================
// Constants
// ============================================================================

/// Close reason used when the handle is dropped without an explicit close.
const DISPOSED_REASON: &str = "Disposed";

// ============================================================================
// ResourceInner
// ============================================================================

/// State shared between the handle, the lane and the reader task.
pub(crate) struct ResourceInner {
    /// Identifier used in every log line.
    pub id: ResourceId,
    /// Current ready state.
    pub state: StateCell,
    /// Handler slots.
    pub callbacks: CallbackRegistry,
    /// Fires once the connect attempt has concluded.
    pub connect_barrier: Signal,
    /// Fires once the close sequence has run.
    pub close_completion: Signal,
    /// Set by the first `connect` call.
    pub connect_requested: AtomicBool,
}

impl ResourceInner {
    fn new(id: ResourceId) -> Self {
        Self {
            id,
            state: StateCell::new(),
            callbacks: CallbackRegistry::default(),
            connect_barrier: Signal::new(),
            close_completion: Signal::new(),
            connect_requested: AtomicBool::new(false),
        }
    }

    /// Enters the terminal state and releases close waiters.
    pub(crate) fn finish_close(&self) {
        self.state.mark_closed();
        self.close_completion.fire();
    }

    /// Handles a close initiated by the peer (or a dropped connection).
    ///
    /// Ignored unless the resource is `Open`, so a locally initiated close
    /// keeps its exactly-once `OnClose`.
    pub(crate) fn remote_close(&self, code: CloseCode, reason: &str) {
        if !self.state.begin_remote_closing() {
            return;
        }

        info!(resource = %self.id, %code, %reason, "Closed by peer");
        self.callbacks.closed(code, reason);
        self.finish_close();
    }
}

// ============================================================================
// WebSocketResource
// ============================================================================

/// An asynchronous WebSocket client connection.
///
/// # Example
///
/// ```no_run
/// use websocket_resource::{CloseCode, WebSocketResource};
///
/// # fn example() -> websocket_resource::Result<()> {
/// let resource = WebSocketResource::new("wss://example.com/socket", [])?;
///
/// resource.on_connect(|| println!("connected"));
/// resource.on_message(|_, content, _| println!("received {content}"));
/// resource.on_error(|error| eprintln!("{error}"));
///
/// resource.connect(Vec::new(), []);
/// resource.send("hello");
/// resource.close(CloseCode::Normal, "bye");
/// # Ok(())
/// # }
/// ```
pub struct WebSocketResource {
    /// Shared state.
    inner: Arc<ResourceInner>,
    /// Target URL.
    url: Url,
    /// Channel to the lane actor.
    commands: mpsc::UnboundedSender<LaneCommand>,
    /// Private runtime; taken on drop.
    runtime: Option<Runtime>,
    /// Name of the runtime's worker threads.
    thread_name: String,
}

// ============================================================================
// WebSocketResource - Display
// ============================================================================

impl fmt::Debug for WebSocketResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebSocketResource")
            .field("id", &self.inner.id)
            .field("url", &self.url.as_str())
            .field("ready_state", &self.inner.state.get())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// WebSocketResource - Constructors
// ============================================================================

impl WebSocketResource {
    /// Creates a resource for `url` using the default transport.
    ///
    /// # Arguments
    ///
    /// * `url` - `ws://` or `wss://` URL
    /// * `trust_exceptions` - certificate failures to tolerate on `wss`
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidUrl`](crate::Error::InvalidUrl) if `url` does not parse
    /// - [`Error::Config`](crate::Error::Config) if the scheme is not `ws`/`wss`
    /// - [`Error::Io`](crate::Error::Io) if the runtime cannot be started
    pub fn new(
        url: impl Into<String>,
        trust_exceptions: impl IntoIterator<Item = CertException>,
    ) -> Result<Self> {
        Self::builder(url).trust_all(trust_exceptions).build()
    }

    /// Creates a builder for a resource targeting `url`.
    #[inline]
    #[must_use]
    pub fn builder(url: impl Into<String>) -> ResourceBuilder {
        ResourceBuilder::new(url)
    }

    /// Starts the runtime and the lane.
    pub(crate) fn start(
        url: Url,
        options: ResourceOptions,
        transport: Box<dyn Transport>,
    ) -> Result<Self> {
        options.validate()?;

        let id = ResourceId::generate();
        let thread_name = format!("ws-resource-{id}");

        let runtime = Builder::new_multi_thread()
            .worker_threads(options.worker_threads)
            .thread_name(thread_name.clone())
            .enable_all()
            .build()?;

        let inner = Arc::new(ResourceInner::new(id));
        let (commands, command_rx) = mpsc::unbounded_channel();

        let lane = Lane::new(Arc::clone(&inner), transport, command_rx, options);
        runtime.spawn(lane.run());

        debug!(resource = %id, url = %url, "Resource created");

        Ok(Self {
            inner,
            url,
            commands,
            runtime: Some(runtime),
            thread_name,
        })
    }
}

// ============================================================================
// WebSocketResource - Accessors
// ============================================================================

impl WebSocketResource {
    /// Returns the resource identifier.
    #[inline]
    #[must_use]
    pub fn id(&self) -> ResourceId {
        self.inner.id
    }

    /// Returns the target URL.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the current ready state. Never blocks.
    #[inline]
    #[must_use]
    pub fn ready_state(&self) -> ReadyState {
        self.inner.state.get()
    }

    /// Blocks until the close sequence has completed or `limit` elapses.
    ///
    /// Returns `true` if the resource is closed.
    pub fn wait_closed(&self, limit: Duration) -> bool {
        self.inner.close_completion.wait_blocking_for(limit)
    }
}

// ============================================================================
// WebSocketResource - Operations
// ============================================================================

impl WebSocketResource {
    /// Starts the connect attempt.
    ///
    /// The state is already `Connecting` when this returns. Only the first
    /// call has an effect; connecting after a close was accepted is ignored.
    ///
    /// # Arguments
    ///
    /// * `protocols` - subprotocols to request
    /// * `headers` - extra handshake headers
    pub fn connect(
        &self,
        protocols: Vec<String>,
        headers: impl IntoIterator<Item = (String, String)>,
    ) {
        if self.inner.connect_requested.swap(true, Ordering::SeqCst) {
            warn!(resource = %self.inner.id, "Connect already requested; ignoring");
            return;
        }

        if self.inner.state.get().is_closing_or_closed() {
            debug!(resource = %self.inner.id, "Connect after close; ignoring");
            // The close sequence may be waiting on this attempt.
            self.inner.connect_barrier.fire();
            return;
        }

        let request = ConnectRequest {
            url: self.url.clone(),
            protocols,
            headers: headers.into_iter().collect(),
        };

        self.dispatch(LaneCommand::Connect(request));
    }

    /// Sends an empty ping once connected.
    pub fn ping(&self) {
        self.dispatch(LaneCommand::Enqueue(LaneOp::Ping));
    }

    /// Queues a text message.
    pub fn send(&self, text: impl Into<String>) {
        self.enqueue(text.into(), false);
    }

    /// Queues a binary message given as base64.
    ///
    /// The payload is decoded when it is written; malformed base64 is
    /// reported as [`ErrorKind::Encoding`](crate::ErrorKind::Encoding).
    pub fn send_binary(&self, base64: impl Into<String>) {
        self.enqueue(base64.into(), true);
    }

    /// Requests the close sequence.
    ///
    /// Accepted only while neither `Closing` nor `Closed`; other calls are
    /// ignored. An accepted close moves the state to `Closing` before this
    /// returns and runs once the connect attempt has concluded.
    pub fn close(&self, code: CloseCode, reason: impl Into<String>) {
        let Some(previous) = self.inner.state.begin_closing() else {
            debug!(resource = %self.inner.id, %code, "Close already requested; ignoring");
            return;
        };

        let reason = reason.into();
        debug!(resource = %self.inner.id, %previous, %code, %reason, "Close requested");

        if !self.inner.connect_requested.load(Ordering::SeqCst) {
            // No connect attempt will ever fire the barrier.
            self.inner.connect_barrier.fire();
        }

        self.dispatch(LaneCommand::Enqueue(LaneOp::Close { code, reason }));
    }

    fn enqueue(&self, payload: String, is_binary: bool) {
        let write = PendingWrite { payload, is_binary };
        self.dispatch(LaneCommand::Enqueue(LaneOp::Write(write)));
    }

    fn dispatch(&self, command: LaneCommand) {
        if self.commands.send(command).is_err() {
            warn!(resource = %self.inner.id, "Lane is gone; request dropped");
        }
    }
}

// ============================================================================
// WebSocketResource - Handlers
// ============================================================================

impl WebSocketResource {
    /// Sets the handler called once the connection is open.
    pub fn on_connect(&self, handler: impl Fn() + Send + Sync + 'static) {
        self.inner.callbacks.set_connect(Arc::new(handler));
    }

    /// Sets the handler called after each successful ping.
    pub fn on_ping(&self, handler: impl Fn() + Send + Sync + 'static) {
        self.inner.callbacks.set_ping(Arc::new(handler));
    }

    /// Sets the handler called after each message write with its byte length.
    ///
    /// For binary messages the length is that of the decoded bytes.
    pub fn on_send(&self, handler: impl Fn(usize) + Send + Sync + 'static) {
        self.inner.callbacks.set_send(Arc::new(handler));
    }

    /// Sets the handler called for each inbound message.
    pub fn on_message(&self, handler: impl Fn(usize, &str, bool) + Send + Sync + 'static) {
        self.inner.callbacks.set_message(Arc::new(handler));
    }

    /// Sets the handler called when the close sequence completes.
    pub fn on_close(&self, handler: impl Fn(CloseCode, &str) + Send + Sync + 'static) {
        self.inner.callbacks.set_close(Arc::new(handler));
    }

    /// Sets the handler receiving every asynchronous failure.
    pub fn on_error(&self, handler: impl Fn(ResourceError) + Send + Sync + 'static) {
        self.inner.callbacks.set_error(Arc::new(handler));
    }
}

// ============================================================================
// WebSocketResource - Drop
// ============================================================================

impl WebSocketResource {
    /// Returns `true` when called from this resource's own worker threads.
    fn on_own_worker(&self) -> bool {
        thread::current().name() == Some(self.thread_name.as_str())
    }
}

impl Drop for WebSocketResource {
    fn drop(&mut self) {
        self.close(CloseCode::GoingAway, DISPOSED_REASON);

        let Some(runtime) = self.runtime.take() else {
            return;
        };

        let inner = Arc::clone(&self.inner);

        if self.on_own_worker() {
            // Blocking here would stall the lane that has to finish the close.
            warn!(resource = %inner.id, "Dropped from a handler; finishing close in background");
            thread::spawn(move || {
                inner.close_completion.wait_blocking();
                runtime.shutdown_background();
            });
            return;
        }

        inner.close_completion.wait_blocking();
        runtime.shutdown_background();
        debug!(resource = %inner.id, "Resource disposed");
    }
}
