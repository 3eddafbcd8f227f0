//! WebSocket implementation of [`Connector`] and [`Transport`].
//!
//! Uses `tokio-tungstenite` for the HTTP upgrade handshake and framing.  The
//! stream is split on connect: the write half stays in [`WsTransport`], and
//! the read half is drained by a small background task.
//!
//! # Why drain inbound frames?
//!
//! The bridge never expects a reply, but a relay server typically echoes every
//! record to all of its clients, including this one.  Unread frames would
//! pile up in the socket buffer until the server's writes stall.  Reading them
//! also lets tungstenite answer pings and notice a close frame, so the next
//! write fails promptly instead of disappearing into a dead socket.

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{Error as WsError, Message as WsMessage},
    MaybeTlsStream, WebSocketStream,
};
use tracing::debug;

use super::{ConnectError, ConnectFailureReason, Connector, SendError, Transport};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Dials a fixed `ws://` endpoint.
#[derive(Debug, Clone)]
pub struct WsConnector {
    endpoint: String,
}

impl WsConnector {
    /// Creates a connector for `endpoint`.  The URL is not checked until the
    /// first connection attempt.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl Connector for WsConnector {
    type Transport = WsTransport;

    async fn connect(&self) -> Result<WsTransport, ConnectError> {
        let (stream, response) = connect_async(self.endpoint.as_str())
            .await
            .map_err(|e| ConnectError {
                endpoint: self.endpoint.clone(),
                reason: classify_connect_error(&e),
            })?;
        debug!(
            "WebSocket handshake with {} completed ({})",
            self.endpoint,
            response.status()
        );

        let (sink, inbound) = stream.split();
        let drain = tokio::spawn(drain_inbound(inbound, self.endpoint.clone()));
        Ok(WsTransport { sink, drain })
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Write half of a live WebSocket connection.
pub struct WsTransport {
    sink: SplitSink<WsStream, WsMessage>,
    drain: JoinHandle<()>,
}

#[async_trait]
impl Transport for WsTransport {
    async fn send_text(&mut self, text: String) -> Result<(), SendError> {
        self.sink
            .send(WsMessage::Text(text))
            .await
            .map_err(classify_send_error)
    }

    async fn close(&mut self) {
        if let Err(e) = self.sink.close().await {
            debug!("error while closing WebSocket: {e}");
        }
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        self.drain.abort();
    }
}

/// Reads and discards inbound frames until the connection ends.
async fn drain_inbound(mut inbound: SplitStream<WsStream>, endpoint: String) {
    while let Some(frame) = inbound.next().await {
        match frame {
            Ok(WsMessage::Text(text)) => debug!("ignoring text frame from {endpoint}: {text}"),
            Ok(WsMessage::Binary(data)) => {
                debug!("ignoring {} byte binary frame from {endpoint}", data.len())
            }
            Ok(WsMessage::Close(_)) => {
                debug!("{endpoint} sent a close frame");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                debug!("inbound stream from {endpoint} ended: {e}");
                break;
            }
        }
    }
}

/// Maps a tungstenite handshake error to the reason logged on retry.
pub fn classify_connect_error(error: &WsError) -> ConnectFailureReason {
    match error {
        WsError::Io(io) => match io.kind() {
            std::io::ErrorKind::ConnectionRefused => ConnectFailureReason::Refused,
            std::io::ErrorKind::TimedOut => ConnectFailureReason::TimedOut,
            std::io::ErrorKind::NotFound
            | std::io::ErrorKind::AddrNotAvailable
            | std::io::ErrorKind::PermissionDenied => {
                ConnectFailureReason::Unreachable(io.to_string())
            }
            _ => ConnectFailureReason::Io(io.to_string()),
        },
        WsError::Http(response) => {
            ConnectFailureReason::HandshakeRejected(response.status().as_u16())
        }
        WsError::Url(e) => ConnectFailureReason::InvalidUrl(e.to_string()),
        other => ConnectFailureReason::Protocol(other.to_string()),
    }
}

fn classify_send_error(error: WsError) -> SendError {
    match error {
        WsError::ConnectionClosed | WsError::AlreadyClosed => SendError::Closed,
        other => SendError::Transport(other.to_string()),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
