//! Scripted connector for unit and integration testing.
//!
//! Lets tests decide which connection attempts fail (and why) and which
//! writes fail, then inspect every frame that was "delivered" without a real
//! server.  Clones share the same script, so a test can keep one clone for
//! inspection while the [`ConnectionManager`] owns another.
//!
//! [`ConnectionManager`]: super::ConnectionManager

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{ConnectError, ConnectFailureReason, Connector, SendError, Transport};

/// A frame written through a [`ScriptedTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentFrame {
    /// 1-based index of the connection that carried the frame.
    pub connection: usize,
    /// The frame's text.
    pub text: String,
}

#[derive(Default)]
struct Script {
    connect_failures: VecDeque<ConnectFailureReason>,
    send_failures: usize,
    attempts: usize,
    connections: usize,
    closed: usize,
    sent: Vec<SentFrame>,
}

/// A [`Connector`] whose behaviour is scripted by the test.
#[derive(Clone, Default)]
pub struct ScriptedConnector {
    script: Arc<Mutex<Script>>,
}

impl ScriptedConnector {
    /// Creates a connector whose attempts all succeed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a connector whose first `failures` attempts are refused.
    pub fn failing_first(failures: usize) -> Self {
        let connector = Self::new();
        for _ in 0..failures {
            connector.push_connect_failure(ConnectFailureReason::Refused);
        }
        connector
    }

    /// Makes the next not-yet-scripted attempt fail with `reason`.
    pub fn push_connect_failure(&self, reason: ConnectFailureReason) {
        self.lock().connect_failures.push_back(reason);
    }

    /// Makes the next `count` writes fail, whichever connection they use.
    pub fn fail_next_sends(&self, count: usize) {
        self.lock().send_failures += count;
    }

    /// Number of connection attempts so far.
    pub fn attempts(&self) -> usize {
        self.lock().attempts
    }

    /// Number of successful connections so far.
    pub fn connections(&self) -> usize {
        self.lock().connections
    }

    /// Number of transports closed through [`Transport::close`].
    pub fn closed(&self) -> usize {
        self.lock().closed
    }

    /// Every successfully written frame, in order.
    pub fn sent(&self) -> Vec<SentFrame> {
        self.lock().sent.clone()
    }

    /// Texts of every successfully written frame, in order.
    pub fn sent_texts(&self) -> Vec<String> {
        self.lock().sent.iter().map(|f| f.text.clone()).collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().expect("lock poisoned")
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    type Transport = ScriptedTransport;

    async fn connect(&self) -> Result<ScriptedTransport, ConnectError> {
        let mut script = self.lock();
        script.attempts += 1;
        if let Some(reason) = script.connect_failures.pop_front() {
            return Err(ConnectError {
                endpoint: self.endpoint().to_string(),
                reason,
            });
        }
        script.connections += 1;
        Ok(ScriptedTransport {
            connection: script.connections,
            script: Arc::clone(&self.script),
        })
    }

    fn endpoint(&self) -> &str {
        "ws://scripted.invalid"
    }
}

/// The transport handed out by [`ScriptedConnector`].
pub struct ScriptedTransport {
    connection: usize,
    script: Arc<Mutex<Script>>,
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send_text(&mut self, text: String) -> Result<(), SendError> {
        let mut script = self.script.lock().expect("lock poisoned");
        if script.send_failures > 0 {
            script.send_failures -= 1;
            return Err(SendError::Transport("injected failure".to_string()));
        }
        script.sent.push(SentFrame {
            connection: self.connection,
            text,
        });
        Ok(())
    }

    async fn close(&mut self) {
        self.script.lock().expect("lock poisoned").closed += 1;
    }
}
