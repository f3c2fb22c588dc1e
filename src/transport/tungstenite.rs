//! Default transport over `tokio-tungstenite`.
//!
//! The socket is split on connect: the writer half stays inside the
//! transport (and therefore inside the lane that owns it), the reader half
//! is returned as the [`InboundStream`].

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use futures_util::future;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use rustc_hash::FxHashSet;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Error as WsError;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::header::{
    HeaderName, HeaderValue, SEC_WEBSOCKET_PROTOCOL,
};
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async_tls_with_config};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::protocol::{CloseCode, InboundFrame, OutgoingFrame};

use super::tls::{self, CertException};
use super::{ConnectRequest, InboundStream, Transport};

// ============================================================================
// Types
// ============================================================================

/// Connected socket type.
type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Writer half of the socket.
type WsWriter = SplitSink<WsStream, Message>;

// ============================================================================
// TungsteniteTransport
// ============================================================================

/// [`Transport`] backed by `tokio-tungstenite`.
#[derive(Default)]
pub struct TungsteniteTransport {
    /// Certificate failures to tolerate on `wss` URLs.
    trust: FxHashSet<CertException>,
    /// Writer half, present once connected.
    writer: Option<WsWriter>,
}

impl TungsteniteTransport {
    /// Creates a transport with default certificate validation.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport tolerating the given certificate failures.
    #[must_use]
    pub fn with_trust(trust: impl IntoIterator<Item = CertException>) -> Self {
        Self {
            trust: trust.into_iter().collect(),
            writer: None,
        }
    }

    /// Returns `true` while the writer half is available.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.writer.is_some()
    }

    /// Builds the handshake request: URL, subprotocols, extra headers.
    fn build_request(request: &ConnectRequest) -> Result<Request> {
        let mut client_request = request.url.as_str().into_client_request()?;
        let headers = client_request.headers_mut();

        for (name, value) in &request.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::invalid_header(name, e.to_string()))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|e| Error::invalid_header(name, e.to_string()))?;
            headers.insert(header_name, header_value);
        }

        if !request.protocols.is_empty() {
            let protocols = request.protocols.join(", ");
            let value = HeaderValue::from_str(&protocols).map_err(|e| {
                Error::invalid_header(SEC_WEBSOCKET_PROTOCOL.as_str(), e.to_string())
            })?;
            headers.insert(SEC_WEBSOCKET_PROTOCOL, value);
        }

        Ok(client_request)
    }
}

// ============================================================================
// Transport Implementation
// ============================================================================

#[async_trait]
impl Transport for TungsteniteTransport {
    async fn connect(&mut self, request: &ConnectRequest) -> Result<InboundStream> {
        if self.writer.is_some() {
            return Err(Error::connection("transport is already connected"));
        }

        let client_request = Self::build_request(request)?;
        let connector = tls::connector_for(&request.url, &self.trust)?;

        debug!(url = %request.url, "Performing WebSocket handshake");

        let (stream, response) =
            connect_async_tls_with_config(client_request, None, false, connector).await?;

        debug!(status = %response.status(), "WebSocket handshake completed");

        let (writer, reader) = stream.split();
        self.writer = Some(writer);

        Ok(reader
            .filter_map(|message| future::ready(map_inbound(message)))
            .boxed())
    }

    async fn send(&mut self, frame: OutgoingFrame) -> Result<()> {
        let writer = self.writer.as_mut().ok_or(Error::ConnectionClosed)?;

        let bytes = frame.len();
        let message = match frame {
            OutgoingFrame::Text(text) => Message::Text(text.into()),
            OutgoingFrame::Binary(data) => Message::Binary(data.into()),
            OutgoingFrame::Ping(data) => Message::Ping(data.into()),
        };

        writer.send(message).await?;
        trace!(bytes, "Frame written");
        Ok(())
    }

    async fn close(&mut self, code: CloseCode, reason: &str) -> Result<()> {
        if !code.is_sendable() {
            return Err(Error::connection(format!(
                "close code {code} may not be sent in a close frame"
            )));
        }

        let Some(mut writer) = self.writer.take() else {
            debug!("Close requested on a transport that never connected");
            return Ok(());
        };

        let frame = CloseFrame {
            code: code.as_u16().into(),
            reason: reason.to_owned().into(),
        };

        writer.send(Message::Close(Some(frame))).await?;
        debug!(%code, "Close frame sent");
        Ok(())
    }
}

// ============================================================================
// Inbound Mapping
// ============================================================================

/// Maps a raw socket message onto an [`InboundFrame`].
///
/// Ping/pong are answered by tungstenite and dropped here.
fn map_inbound(message: std::result::Result<Message, WsError>) -> Option<Result<InboundFrame>> {
    match message {
        Ok(Message::Text(text)) => Some(Ok(InboundFrame::Text(text.as_str().to_owned()))),
        Ok(Message::Binary(data)) => Some(Ok(InboundFrame::Binary(data.to_vec()))),
        Ok(Message::Close(frame)) => {
            let (code, reason) = frame
                .map(|f| (CloseCode::from(u16::from(f.code)), f.reason.as_str().to_owned()))
                .unwrap_or((CloseCode::NoStatus, String::new()));
            Some(Ok(InboundFrame::Close { code, reason }))
        }
        Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => None,
        Err(e) => Some(Err(e.into())),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use rustc_hash::FxHashMap;
    use url::Url;

    fn request(url: &str) -> ConnectRequest {
        ConnectRequest {
            url: Url::parse(url).unwrap(),
            protocols: Vec::new(),
            headers: FxHashMap::default(),
        }
    }

    #[test]
    fn test_build_request_protocols_and_headers() {
        let mut req = request("ws://127.0.0.1:9000/socket");
        req.protocols = vec!["chat".into(), "superchat".into()];
        req.headers.insert("Origin".into(), "http://localhost".into());

        let built = TungsteniteTransport::build_request(&req).unwrap();
        assert_eq!(
            built.headers().get(SEC_WEBSOCKET_PROTOCOL).unwrap(),
            "chat, superchat"
        );
        assert_eq!(built.headers().get("origin").unwrap(), "http://localhost");
    }

    #[test]
    fn test_build_request_rejects_bad_header() {
        let mut req = request("ws://127.0.0.1:9000");
        req.headers.insert("bad header".into(), "x".into());

        let err = TungsteniteTransport::build_request(&req).unwrap_err();
        assert!(matches!(err, Error::InvalidHeader { .. }));
    }

    #[test]
    fn test_map_inbound() {
        let text = map_inbound(Ok(Message::Text("hi".into()))).unwrap().unwrap();
        assert_eq!(text, InboundFrame::Text("hi".into()));

        let binary = map_inbound(Ok(Message::Binary(vec![1u8, 2].into())))
            .unwrap()
            .unwrap();
        assert_eq!(binary, InboundFrame::Binary(vec![1, 2]));

        assert!(map_inbound(Ok(Message::Ping(Vec::<u8>::new().into()))).is_none());
    }

    #[test]
    fn test_map_inbound_close_without_frame() {
        let close = map_inbound(Ok(Message::Close(None))).unwrap().unwrap();
        assert_eq!(
            close,
            InboundFrame::Close {
                code: CloseCode::NoStatus,
                reason: String::new()
            }
        );
    }

    #[tokio::test]
    async fn test_send_before_connect_fails() {
        let mut transport = TungsteniteTransport::new();
        let err = transport
            .send(OutgoingFrame::Text("x".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ConnectionClosed));
    }

    #[tokio::test]
    async fn test_close_before_connect_is_noop() {
        let mut transport = TungsteniteTransport::new();
        transport.close(CloseCode::Normal, "bye").await.unwrap();
        assert!(!transport.is_connected());
    }

    #[tokio::test]
    async fn test_close_with_reserved_code_fails() {
        let mut transport = TungsteniteTransport::new();
        let err = transport.close(CloseCode::Abnormal, "").await.unwrap_err();
        assert!(matches!(err, Error::Connection { .. }));
    }

    #[tokio::test]
    async fn test_close_with_unassigned_code_fails() {
        let mut transport = TungsteniteTransport::new();
        for code in [999, 2000] {
            let err = transport
                .close(CloseCode::Other(code), "")
                .await
                .unwrap_err();
            assert!(matches!(err, Error::Connection { .. }));
        }
    }
}
