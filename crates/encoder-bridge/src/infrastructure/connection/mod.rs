//! Outbound connection management.
//!
//! The [`ConnectionManager`] owns at most one live connection and hides
//! connection churn from its caller.  It talks to the network only through the
//! [`Connector`] and [`Transport`] traits so the retry and reconnect rules can
//! be unit-tested with [`mock::ScriptedConnector`] and a paused clock.
//!
//! # State machine
//!
//! ```text
//!               ensure_connected()            handshake ok
//! Disconnected ───────────────────► Connecting ────────────► Connected
//!      ▲                             │     ▲                    │
//!      │                             └─────┘ failure:           │
//!      │                            wait backoff, retry         │
//!      └────────────────────────────────────────────────────────┘
//!                              any send failure
//! ```

use async_trait::async_trait;
use thiserror::Error;

use encoder_core::MessageError;

pub mod manager;
pub mod mock;
pub mod websocket;

pub use manager::{ConnectionManager, ConnectionStats, SendOutcome};
pub use websocket::{WsConnector, WsTransport};

/// Observable state of the single outbound connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection handle exists.
    Disconnected,
    /// Attempting to connect, possibly waiting out a backoff.
    Connecting,
    /// A live connection handle exists.
    Connected,
}

/// Enumerated cause of a failed connection attempt, used in log lines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectFailureReason {
    /// Nothing is listening at the endpoint.
    #[error("connection refused")]
    Refused,
    /// The TCP connection attempt timed out.
    #[error("connection timed out")]
    TimedOut,
    /// The host or network could not be reached.
    #[error("host unreachable: {0}")]
    Unreachable(String),
    /// Any other socket-level error.
    #[error("I/O error: {0}")]
    Io(String),
    /// The server answered the upgrade request with a non-101 status.
    #[error("handshake rejected with HTTP status {0}")]
    HandshakeRejected(u16),
    /// The endpoint URL could not be used.
    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(String),
    /// The WebSocket handshake broke the protocol.
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// A failed connection attempt.  Always recovered by retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to connect to {endpoint}: {reason}")]
pub struct ConnectError {
    /// The endpoint that was tried.
    pub endpoint: String,
    /// Why the attempt failed.
    pub reason: ConnectFailureReason,
}

/// A failed transmission on an established connection.
#[derive(Debug, Error)]
pub enum SendError {
    /// The record could not be serialized.
    #[error(transparent)]
    Encode(#[from] MessageError),
    /// The server closed the connection.
    #[error("connection closed by server")]
    Closed,
    /// The socket reported an error while writing.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Opens new connections to a fixed endpoint.
#[async_trait]
pub trait Connector: Send + Sync {
    /// The connection handle produced on success.
    type Transport: Transport;

    /// Performs one connection attempt, without retrying.
    async fn connect(&self) -> Result<Self::Transport, ConnectError>;

    /// The endpoint this connector dials, for log lines.
    fn endpoint(&self) -> &str;
}

/// A live connection that accepts text frames.
#[async_trait]
pub trait Transport: Send {
    /// Writes one text frame.
    async fn send_text(&mut self, text: String) -> Result<(), SendError>;

    /// Closes the connection politely.  Errors are ignored.
    async fn close(&mut self) {}
}
