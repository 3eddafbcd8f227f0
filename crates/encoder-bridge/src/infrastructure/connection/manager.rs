//! The connection-owning half of the bridge.
//!
//! [`ConnectionManager`] is driven by a single Tokio task (see [`run`]).  It is
//! the only owner of the connection handle, so the handle never needs a lock.
//!
//! # Delivery semantics
//!
//! Records are fire-and-forget.  When a write fails the manager drops the
//! broken handle and reconnects *before* `send` returns, so the next record
//! finds a healthy connection, but the record that failed is not retried.
//!
//! [`run`]: ConnectionManager::run

use std::time::Duration;

use encoder_core::InputMessage;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use super::{ConnectionState, Connector, SendError, Transport};

/// What happened to a record passed to [`ConnectionManager::send`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Written to the live connection.
    Delivered,
    /// No connection existed, so nothing was attempted.
    Skipped,
    /// The record was lost; if the write failed the connection was rebuilt.
    Dropped,
}

/// Counters describing the manager's lifetime, for diagnostics and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionStats {
    /// Connection attempts made, successful or not.
    pub connect_attempts: u64,
    /// Connections successfully established.
    pub connections: u64,
    /// Records written to a connection.
    pub delivered: u64,
    /// Records lost to a failed write or encoding error.
    pub dropped: u64,
    /// Records skipped because no connection existed.
    pub skipped: u64,
}

/// Maintains at most one live outbound connection.
pub struct ConnectionManager<C: Connector> {
    connector: C,
    backoff: Duration,
    transport: Option<C::Transport>,
    state: watch::Sender<ConnectionState>,
    stats: ConnectionStats,
}

impl<C: Connector> ConnectionManager<C> {
    /// Creates a disconnected manager.  Nothing is dialled until
    /// [`ensure_connected`](Self::ensure_connected) or [`run`](Self::run).
    pub fn new(connector: C, backoff: Duration) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            connector,
            backoff,
            transport: None,
            state,
            stats: ConnectionStats::default(),
        }
    }

    /// Returns a receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// `true` while a connection handle exists.
    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    /// Lifetime counters.
    pub fn stats(&self) -> ConnectionStats {
        self.stats
    }

    /// Opens a connection if none exists, retrying forever.
    ///
    /// Each failed attempt is logged with its [`ConnectFailureReason`] and
    /// followed by a fixed wait of `backoff`.  There is no attempt limit, so
    /// this only returns once a connection is live.
    ///
    /// [`ConnectFailureReason`]: super::ConnectFailureReason
    pub async fn ensure_connected(&mut self) {
        if self.transport.is_some() {
            return;
        }

        self.set_state(ConnectionState::Connecting);
        let mut attempt: u64 = 0;
        loop {
            attempt += 1;
            self.stats.connect_attempts += 1;

            match self.connector.connect().await {
                Ok(transport) => {
                    info!(
                        "connected to {} (attempt {attempt})",
                        self.connector.endpoint()
                    );
                    self.transport = Some(transport);
                    self.stats.connections += 1;
                    self.set_state(ConnectionState::Connected);
                    return;
                }
                Err(e) => {
                    warn!(
                        reason = %e.reason,
                        "connection attempt {attempt} to {} failed; retrying in {:?}",
                        e.endpoint,
                        self.backoff
                    );
                    tokio::time::sleep(self.backoff).await;
                }
            }
        }
    }

    /// Sends one record on the current connection.
    ///
    /// - No connection: the record is skipped.
    /// - Write fails: the handle is discarded and [`ensure_connected`] runs
    ///   before this returns; the record itself is lost.
    ///
    /// [`ensure_connected`]: Self::ensure_connected
    pub async fn send(&mut self, msg: &InputMessage) -> SendOutcome {
        let Some(transport) = self.transport.as_mut() else {
            debug!("not connected; skipping {} message", msg.kind());
            self.stats.skipped += 1;
            return SendOutcome::Skipped;
        };

        let text = match msg.to_json() {
            Ok(text) => text,
            Err(e) => {
                error!("{e}");
                self.stats.dropped += 1;
                return SendOutcome::Dropped;
            }
        };

        match transport.send_text(text).await {
            Ok(()) => {
                debug!("sent {msg:?}");
                self.stats.delivered += 1;
                SendOutcome::Delivered
            }
            Err(e) => {
                warn!("failed to send {} message: {e}", msg.kind());
                self.discard(&e);
                self.stats.dropped += 1;
                self.ensure_connected().await;
                SendOutcome::Dropped
            }
        }
    }

    /// Connects, then forwards every record from `messages` until all
    /// senders are dropped.
    pub async fn run(&mut self, mut messages: mpsc::Receiver<InputMessage>) {
        self.ensure_connected().await;
        while let Some(msg) = messages.recv().await {
            self.send(&msg).await;
        }
        info!("message channel closed; connection manager stopping");
    }

    /// Closes the live connection, if any.
    pub async fn close(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.close().await;
            info!("closed connection to {}", self.connector.endpoint());
        }
        self.set_state(ConnectionState::Disconnected);
    }

    fn discard(&mut self, cause: &SendError) {
        debug!("discarding connection to {}: {cause}", self.connector.endpoint());
        self.transport = None;
        self.set_state(ConnectionState::Disconnected);
    }

    fn set_state(&self, next: ConnectionState) {
        self.state.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
