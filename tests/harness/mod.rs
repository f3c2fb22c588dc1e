//! Shared test harness.
//!
//! Provides a scripted in-memory [`Transport`] and an event recorder that
//! turns every handler invocation into an [`Event`] on a channel.

#![allow(dead_code)]

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::mpsc as std_mpsc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream;
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};

use websocket_resource::{
    CloseCode, ConnectRequest, Error, ErrorKind, InboundFrame, InboundStream, OutgoingFrame,
    Result, Transport, WebSocketResource,
};

// ============================================================================
// Constants
// ============================================================================

/// Upper bound on waiting for a single event.
pub const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

/// How long to listen before concluding no further event arrives.
pub const QUIET_PERIOD: Duration = Duration::from_millis(150);

// ============================================================================
// Events
// ============================================================================

/// A handler invocation observed by the recorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Connect,
    Ping,
    Send(usize),
    Message(usize, String, bool),
    Close(CloseCode, String),
    Error(ErrorKind, String),
}

/// Registers all six handlers on `resource` and returns their event feed.
pub fn record(resource: &WebSocketResource) -> std_mpsc::Receiver<Event> {
    let (tx, rx) = std_mpsc::channel();

    let sink = tx.clone();
    resource.on_connect(move || {
        let _ = sink.send(Event::Connect);
    });
    let sink = tx.clone();
    resource.on_ping(move || {
        let _ = sink.send(Event::Ping);
    });
    let sink = tx.clone();
    resource.on_send(move |length| {
        let _ = sink.send(Event::Send(length));
    });
    let sink = tx.clone();
    resource.on_message(move |length, content, is_binary| {
        let _ = sink.send(Event::Message(length, content.to_string(), is_binary));
    });
    let sink = tx.clone();
    resource.on_close(move |code, reason| {
        let _ = sink.send(Event::Close(code, reason.to_string()));
    });
    resource.on_error(move |error| {
        let _ = tx.send(Event::Error(error.kind, error.message));
    });

    rx
}

/// Waits for the next event.
pub fn next_event(events: &std_mpsc::Receiver<Event>) -> Event {
    events
        .recv_timeout(EVENT_TIMEOUT)
        .expect("timed out waiting for event")
}

/// Asserts that no event arrives within [`QUIET_PERIOD`].
pub fn assert_quiet(events: &std_mpsc::Receiver<Event>) {
    if let Ok(event) = events.recv_timeout(QUIET_PERIOD) {
        panic!("unexpected event: {event:?}");
    }
}

// ============================================================================
// Scripted Transport
// ============================================================================

/// A frame or close observed by the mock transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Written {
    Text(String),
    Binary(Vec<u8>),
    Ping,
    Close(CloseCode, String),
}

/// Test-side controls of a [`MockTransport`].
pub struct MockHandle {
    /// Everything the lane wrote, in order.
    pub written: Arc<Mutex<Vec<Written>>>,
    /// Connect requests received.
    pub requests: Arc<Mutex<Vec<ConnectRequest>>>,
    /// Releases a gated connect.
    gate: Option<oneshot::Sender<()>>,
    /// Feeds the inbound stream; dropping it ends the stream.
    inbound: Option<mpsc::UnboundedSender<Result<InboundFrame>>>,
}

impl MockHandle {
    /// Returns a snapshot of the written frames.
    pub fn written(&self) -> Vec<Written> {
        self.written.lock().clone()
    }

    /// Lets a gated connect proceed.
    pub fn release(&mut self) {
        if let Some(gate) = self.gate.take() {
            let _ = gate.send(());
        }
    }

    /// Delivers an inbound frame.
    pub fn push(&self, frame: InboundFrame) {
        if let Some(inbound) = &self.inbound {
            let _ = inbound.send(Ok(frame));
        }
    }

    /// Delivers an inbound read error.
    pub fn push_error(&self, error: Error) {
        if let Some(inbound) = &self.inbound {
            let _ = inbound.send(Err(error));
        }
    }

    /// Ends the inbound stream as if the connection dropped.
    pub fn hang_up(&mut self) {
        self.inbound = None;
    }
}

/// In-memory transport driven by a [`MockHandle`].
pub struct MockTransport {
    written: Arc<Mutex<Vec<Written>>>,
    requests: Arc<Mutex<Vec<ConnectRequest>>>,
    gate: Option<oneshot::Receiver<()>>,
    inbound: Option<mpsc::UnboundedReceiver<Result<InboundFrame>>>,
    fail_connect: bool,
    fail_send: bool,
}

impl MockTransport {
    /// Creates a transport whose connect succeeds immediately.
    pub fn new() -> (Self, MockHandle) {
        let written = Arc::new(Mutex::new(Vec::new()));
        let requests = Arc::new(Mutex::new(Vec::new()));
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();

        let transport = Self {
            written: Arc::clone(&written),
            requests: Arc::clone(&requests),
            gate: None,
            inbound: Some(inbound_rx),
            fail_connect: false,
            fail_send: false,
        };
        let handle = MockHandle {
            written,
            requests,
            gate: None,
            inbound: Some(inbound_tx),
        };

        (transport, handle)
    }

    /// Creates a transport whose connect waits for [`MockHandle::release`].
    pub fn gated() -> (Self, MockHandle) {
        let (mut transport, mut handle) = Self::new();
        let (gate_tx, gate_rx) = oneshot::channel();
        transport.gate = Some(gate_rx);
        handle.gate = Some(gate_tx);
        (transport, handle)
    }

    /// Makes the connect attempt fail.
    pub fn failing_connect(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    /// Makes every send fail.
    pub fn failing_send(mut self) -> Self {
        self.fail_send = true;
        self
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&mut self, request: &ConnectRequest) -> Result<InboundStream> {
        self.requests.lock().push(request.clone());

        if let Some(gate) = self.gate.take() {
            let _ = gate.await;
        }

        if self.fail_connect {
            return Err(Error::connection("connection refused"));
        }

        let Some(inbound) = self.inbound.take() else {
            return Err(Error::connection("already connected"));
        };

        let frames = stream::unfold(inbound, |mut inbound| async move {
            inbound.recv().await.map(|frame| (frame, inbound))
        });

        Ok(frames.boxed())
    }

    async fn send(&mut self, frame: OutgoingFrame) -> Result<()> {
        if self.fail_send {
            return Err(Error::ConnectionClosed);
        }

        let written = match frame {
            OutgoingFrame::Text(text) => Written::Text(text),
            OutgoingFrame::Binary(data) => Written::Binary(data),
            OutgoingFrame::Ping(_) => Written::Ping,
        };
        self.written.lock().push(written);
        Ok(())
    }

    async fn close(&mut self, code: CloseCode, reason: &str) -> Result<()> {
        if !code.is_sendable() {
            return Err(Error::connection(format!("close code {code} may not be sent")));
        }

        self.written
            .lock()
            .push(Written::Close(code, reason.to_string()));
        Ok(())
    }
}

/// Builds a resource on top of `transport`.
pub fn resource_with(transport: MockTransport) -> WebSocketResource {
    WebSocketResource::builder("ws://127.0.0.1:9/socket")
        .worker_threads(1)
        .transport(transport)
        .build()
        .expect("failed to build resource")
}
