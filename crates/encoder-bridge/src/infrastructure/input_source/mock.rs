//! Mock input source for testing.
//!
//! Allows tests to inject synthetic [`HardwareEvent`]s without GPIO hardware.

use std::sync::{
    mpsc::{self, Sender},
    Arc, Mutex,
};

use encoder_core::HardwareEvent;

use super::{InputSource, SourceError};

/// A mock implementation of [`InputSource`] that allows tests to inject events.
pub struct MockInputSource {
    sender: Arc<Mutex<Option<Sender<HardwareEvent>>>>,
    initial_position: i64,
}

impl MockInputSource {
    /// Creates a mock source whose encoder starts at position 0.
    pub fn new() -> Self {
        Self::with_initial_position(0)
    }

    /// Creates a mock source whose encoder starts at `position`.
    pub fn with_initial_position(position: i64) -> Self {
        Self {
            sender: Arc::new(Mutex::new(None)),
            initial_position: position,
        }
    }

    /// Injects a synthetic event, as if read from hardware.
    ///
    /// Panics if `start()` has not been called or if `stop()` has been called.
    pub fn inject_event(&self, event: HardwareEvent) {
        let guard = self.sender.lock().expect("lock poisoned");
        if let Some(ref sender) = *guard {
            sender
                .send(event)
                .expect("receiver has been dropped; call start() first");
        } else {
            panic!("MockInputSource::inject_event called before start()");
        }
    }

    /// Reports the encoder at `position`.
    pub fn rotate_to(&self, position: i64) {
        self.inject_event(HardwareEvent::Rotated { position });
    }

    /// Reports a button press.
    pub fn press(&self) {
        self.inject_event(HardwareEvent::Pressed);
    }
}

impl Default for MockInputSource {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for MockInputSource {
    fn start(&self) -> Result<mpsc::Receiver<HardwareEvent>, SourceError> {
        let mut guard = self.sender.lock().expect("lock poisoned");
        if guard.is_some() {
            return Err(SourceError::AlreadyStarted);
        }
        let (tx, rx) = mpsc::channel();
        *guard = Some(tx);
        Ok(rx)
    }

    fn stop(&self) {
        // Drop the sender to close the channel
        *self.sender.lock().expect("lock poisoned") = None;
    }

    fn initial_position(&self) -> i64 {
        self.initial_position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_input_source_starts_and_receives_events() {
        // Arrange
        let source = MockInputSource::new();
        let rx = source.start().expect("start should succeed");

        // Act
        source.rotate_to(3);
        source.press();

        // Assert
        assert_eq!(rx.recv().unwrap(), HardwareEvent::Rotated { position: 3 });
        assert_eq!(rx.recv().unwrap(), HardwareEvent::Pressed);
    }

    #[test]
    fn test_mock_input_source_stop_closes_channel() {
        // Arrange
        let source = MockInputSource::new();
        let rx = source.start().expect("start should succeed");

        // Act
        source.stop();

        // Assert – channel should be disconnected
        assert!(rx.recv().is_err(), "channel should be closed after stop()");
    }

    #[test]
    fn test_mock_input_source_rejects_second_start() {
        let source = MockInputSource::new();
        let _rx = source.start().unwrap();
        assert!(matches!(source.start(), Err(SourceError::AlreadyStarted)));
    }

    #[test]
    fn test_mock_input_source_restarts_after_stop() {
        let source = MockInputSource::new();
        let _first = source.start().unwrap();
        source.stop();
        assert!(source.start().is_ok());
    }

    #[test]
    fn test_mock_input_source_reports_initial_position() {
        let source = MockInputSource::with_initial_position(10);
        assert_eq!(source.initial_position(), 10);
    }

    #[test]
    #[should_panic(expected = "before start")]
    fn test_inject_before_start_panics() {
        MockInputSource::new().press();
    }
}
