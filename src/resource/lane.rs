//! Sequential execution lane.
//!
//! A single actor task owns the transport and the write queue. Callers talk
//! to it only through [`LaneCommand`]s, so no lock guards the queue and at
//! most one transport write is ever in flight.
//!
//! # Ordering
//!
//! - `Connect` runs inside the actor as soon as it is received.
//! - Writes, pings and closes are appended to one FIFO and are not touched
//!   until the connect barrier has fired.
//! - Each item is fully processed (written, classified, handler invoked)
//!   before the next one starts.
//!
//! Once connected, a separate reader task drains the inbound stream.

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, error, info, trace, warn};

use crate::error::{Error, ErrorKind, ResourceError, Result};
use crate::protocol::{CloseCode, InboundFrame, OutgoingFrame, decode_binary, encode_binary};
use crate::transport::{ConnectRequest, InboundStream, Transport};

use super::core::ResourceInner;
use super::options::ResourceOptions;
use super::state::ReadyState;

// ============================================================================
// Types
// ============================================================================

/// An outgoing message waiting in the queue.
///
/// Binary payloads stay base64 text until the lane writes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PendingWrite {
    /// Text, or base64 when `is_binary`.
    pub payload: String,
    /// Whether `payload` is a base64 binary message.
    pub is_binary: bool,
}

/// An item of the lane FIFO.
#[derive(Debug)]
pub(crate) enum LaneOp {
    /// Send a text or binary message.
    Write(PendingWrite),
    /// Send an empty ping.
    Ping,
    /// Run the close sequence.
    Close {
        /// Close code to send.
        code: CloseCode,
        /// Close reason to send.
        reason: String,
    },
}

/// Messages from the resource handle to the lane.
#[derive(Debug)]
pub(crate) enum LaneCommand {
    /// Perform the connect attempt.
    Connect(ConnectRequest),
    /// Queue an operation behind the connect barrier.
    Enqueue(LaneOp),
}

// ============================================================================
// Lane
// ============================================================================

/// The actor that owns the transport.
pub(crate) struct Lane {
    inner: Arc<ResourceInner>,
    transport: Box<dyn Transport>,
    commands: mpsc::UnboundedReceiver<LaneCommand>,
    queue: VecDeque<LaneOp>,
    options: ResourceOptions,
}

impl Lane {
    pub(crate) fn new(
        inner: Arc<ResourceInner>,
        transport: Box<dyn Transport>,
        commands: mpsc::UnboundedReceiver<LaneCommand>,
        options: ResourceOptions,
    ) -> Self {
        Self {
            inner,
            transport,
            commands,
            queue: VecDeque::new(),
            options,
        }
    }

    /// Runs until the resource handle goes away.
    pub(crate) async fn run(mut self) {
        debug!(resource = %self.inner.id, "Lane started");

        loop {
            tokio::select! {
                biased;

                // Drain first so a busy caller cannot starve the queue.
                () = self.inner.connect_barrier.wait(), if !self.queue.is_empty() => {
                    if let Some(op) = self.queue.pop_front() {
                        self.execute(op).await;
                    }
                }

                command = self.commands.recv() => {
                    match command {
                        Some(LaneCommand::Connect(request)) => self.perform_connect(request).await,
                        Some(LaneCommand::Enqueue(op)) => self.queue.push_back(op),
                        None => break,
                    }
                }
            }
        }

        if !self.queue.is_empty() {
            debug!(
                resource = %self.inner.id,
                dropped = self.queue.len(),
                "Lane stopped with queued operations"
            );
        }
        debug!(resource = %self.inner.id, "Lane terminated");
    }

    async fn execute(&mut self, op: LaneOp) {
        match op {
            LaneOp::Write(write) => self.perform_write(write).await,
            LaneOp::Ping => self.perform_ping().await,
            LaneOp::Close { code, reason } => self.perform_close(code, reason).await,
        }
    }

    // ========================================================================
    // Steps
    // ========================================================================

    async fn perform_connect(&mut self, request: ConnectRequest) {
        let inner = Arc::clone(&self.inner);
        debug!(resource = %inner.id, url = %request.url, "Connecting");

        let result = with_timeout(
            "connect",
            self.options.connect_timeout,
            self.transport.connect(&request),
        )
        .await;

        match result {
            Ok(inbound) => {
                if !inner.state.open() {
                    // A close was accepted while connecting; it runs next.
                    inner.connect_barrier.fire();
                    debug!(resource = %inner.id, "Connected after close was requested");
                    return;
                }

                inner.connect_barrier.fire();
                info!(resource = %inner.id, url = %request.url, "Connected");
                inner.callbacks.connected();

                tokio::spawn(read_inbound(Arc::clone(&inner), inbound));
            }
            Err(e) => {
                error!(resource = %inner.id, error = %e, "Connect failed");
                inner.connect_barrier.fire();
                inner
                    .callbacks
                    .error(ResourceError::from_error(ErrorKind::Connection, &e));
            }
        }
    }

    async fn perform_write(&mut self, write: PendingWrite) {
        let inner = Arc::clone(&self.inner);

        if inner.state.get() != ReadyState::Open {
            trace!(
                resource = %inner.id,
                binary = write.is_binary,
                state = %inner.state.get(),
                "Discarding queued write"
            );
            return;
        }

        let frame = if write.is_binary {
            match decode_binary(&write.payload) {
                Ok(data) => OutgoingFrame::Binary(data),
                Err(e) => {
                    warn!(resource = %inner.id, error = %e, "Rejected binary payload");
                    inner
                        .callbacks
                        .error(ResourceError::from_error(ErrorKind::Encoding, &e));
                    return;
                }
            }
        } else {
            OutgoingFrame::Text(write.payload)
        };

        let length = frame.len();
        let result = with_timeout(
            "send",
            self.options.write_timeout,
            self.transport.send(frame),
        )
        .await;

        match result {
            Ok(()) => {
                trace!(resource = %inner.id, bytes = length, "Message sent");
                inner.callbacks.sent(length);
            }
            Err(e) => {
                error!(resource = %inner.id, error = %e, "Send failed");
                inner
                    .callbacks
                    .error(ResourceError::from_error(ErrorKind::Send, &e));
            }
        }
    }

    async fn perform_ping(&mut self) {
        let inner = Arc::clone(&self.inner);

        if inner.state.get() != ReadyState::Open {
            trace!(resource = %inner.id, "Skipping ping; not open");
            return;
        }

        let result = with_timeout(
            "ping",
            self.options.write_timeout,
            self.transport.send(OutgoingFrame::Ping(Vec::new())),
        )
        .await;

        match result {
            Ok(()) => {
                trace!(resource = %inner.id, "Ping sent");
                inner.callbacks.pinged();
            }
            Err(e) => {
                error!(resource = %inner.id, error = %e, "Ping failed");
                inner
                    .callbacks
                    .error(ResourceError::from_error(ErrorKind::Ping, &e));
            }
        }
    }

    async fn perform_close(&mut self, code: CloseCode, reason: String) {
        let inner = Arc::clone(&self.inner);
        debug!(resource = %inner.id, %code, %reason, "Closing");

        let result = with_timeout(
            "close",
            self.options.close_timeout,
            self.transport.close(code, &reason),
        )
        .await;

        match result {
            Ok(()) => {
                info!(resource = %inner.id, %code, "Closed");
                inner.callbacks.closed(code, &reason);
            }
            Err(e) => {
                error!(resource = %inner.id, error = %e, "Close failed");
                inner
                    .callbacks
                    .error(ResourceError::from_error(ErrorKind::Close, &e));
            }
        }

        inner.finish_close();
    }
}

impl Drop for Lane {
    fn drop(&mut self) {
        // Nothing can complete a close once the lane is gone.
        self.inner.finish_close();
    }
}

// ============================================================================
// Reader
// ============================================================================

/// Delivers inbound frames until the stream ends.
async fn read_inbound(inner: Arc<ResourceInner>, mut inbound: InboundStream) {
    while let Some(frame) = inbound.next().await {
        match frame {
            Ok(InboundFrame::Text(text)) => {
                trace!(resource = %inner.id, bytes = text.len(), "Text message received");
                inner.callbacks.message(text.len(), &text, false);
            }
            Ok(InboundFrame::Binary(data)) => {
                trace!(resource = %inner.id, bytes = data.len(), "Binary message received");
                let encoded = encode_binary(&data);
                inner.callbacks.message(encoded.len(), &encoded, true);
            }
            Ok(InboundFrame::Close { code, reason }) => {
                inner.remote_close(code, &reason);
            }
            Err(e) => {
                error!(resource = %inner.id, error = %e, "Receive failed");
                inner
                    .callbacks
                    .error(ResourceError::from_error(ErrorKind::Receive, &e));
            }
        }
    }

    inner.remote_close(CloseCode::Abnormal, "");
    trace!(resource = %inner.id, "Inbound stream ended");
}

// ============================================================================
// Helpers
// ============================================================================

/// Runs `step`, bounded by `limit` when one is configured.
async fn with_timeout<T>(
    operation: &'static str,
    limit: Option<Duration>,
    step: impl Future<Output = Result<T>>,
) -> Result<T> {
    match limit {
        Some(limit) => timeout(limit, step)
            .await
            .map_err(|_| Error::timeout(operation, millis(limit)))?,
        None => step.await,
    }
}

/// Whole milliseconds in `limit`, saturating at `u64::MAX`.
fn millis(limit: Duration) -> u64 {
    u64::try_from(limit.as_millis()).unwrap_or(u64::MAX)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::future;

    #[tokio::test]
    async fn test_with_timeout_unbounded() {
        let value = with_timeout("send", None, async { Ok::<_, Error>(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_with_timeout_expires() {
        let err = with_timeout(
            "connect",
            Some(Duration::from_millis(10)),
            future::pending::<Result<()>>(),
        )
        .await
        .unwrap_err();

        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "Timeout after 10ms: connect");
    }

    #[test]
    fn test_millis_saturates() {
        assert_eq!(millis(Duration::from_millis(1500)), 1500);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }

    #[tokio::test]
    async fn test_with_timeout_passes_error_through() {
        let err = with_timeout(
            "close",
            Some(Duration::from_secs(1)),
            async { Err::<(), _>(Error::ConnectionClosed) },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::ConnectionClosed));
    }
}
