//! EventDispatcher: translates hardware events into wire messages.
//!
//! The dispatcher is the thin adapter between an input source and the
//! connection task.  It owns the [`EncoderTracker`] (the "last observed
//! position") and hands every produced [`InputMessage`] to a [`MessageSink`].
//!
//! # Never blocking the hardware side
//!
//! The production sink is a bounded `tokio::sync::mpsc::Sender` used through
//! `try_send`.  When the connection task is stuck reconnecting and the channel
//! fills up, new records are dropped with a warning instead of stalling the
//! dispatcher.  This keeps the fire-and-forget delivery semantics: a record is
//! either handed over immediately or lost.

use std::sync::mpsc;

use encoder_core::{EncoderTracker, HardwareEvent, InputMessage};
use thiserror::Error;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info, warn};

/// Why a record could not be handed to the connection task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SinkError {
    /// The channel is full; the record was dropped.
    #[error("message channel is full")]
    Full,
    /// The connection task has stopped.
    #[error("message channel is closed")]
    Closed,
}

/// Destination for records produced by the dispatcher.
#[cfg_attr(test, mockall::automock)]
pub trait MessageSink: Send {
    /// Hands `msg` over without blocking.
    fn submit(&self, msg: InputMessage) -> Result<(), SinkError>;
}

impl MessageSink for tokio::sync::mpsc::Sender<InputMessage> {
    fn submit(&self, msg: InputMessage) -> Result<(), SinkError> {
        self.try_send(msg).map_err(|e| match e {
            TrySendError::Full(_) => SinkError::Full,
            TrySendError::Closed(_) => SinkError::Closed,
        })
    }
}

/// Translates [`HardwareEvent`]s into [`InputMessage`]s.
pub struct EventDispatcher<S> {
    tracker: EncoderTracker,
    sink: S,
}

impl<S: MessageSink> EventDispatcher<S> {
    /// Creates a dispatcher whose first rotation is compared against
    /// `initial_position`.
    pub fn new(sink: S, initial_position: i64) -> Self {
        Self {
            tracker: EncoderTracker::new(initial_position),
            sink,
        }
    }

    /// Returns the last encoder position the dispatcher has seen.
    pub fn last_position(&self) -> i64 {
        self.tracker.last()
    }

    /// Handles one hardware event and returns the record it produced, if any.
    pub fn handle(&mut self, event: HardwareEvent) -> Option<InputMessage> {
        match event {
            HardwareEvent::Rotated { position } => self.on_rotated(position),
            HardwareEvent::Pressed => Some(self.on_pressed()),
        }
    }

    /// Handles an encoder reading.  A reading equal to the previous one
    /// produces nothing but still becomes the new baseline.
    pub fn on_rotated(&mut self, position: i64) -> Option<InputMessage> {
        let previous = self.tracker.last();
        let direction = self.tracker.observe(position)?;

        info!(
            "[encoder] position: {position}, delta: {}, direction: {}",
            position.saturating_sub(previous),
            direction.as_step()
        );
        let msg = InputMessage::Encoder(direction);
        self.deliver(msg);
        Some(msg)
    }

    /// Handles a button press.
    pub fn on_pressed(&mut self) -> InputMessage {
        info!("[button] pressed");
        let msg = InputMessage::button_pressed();
        self.deliver(msg);
        msg
    }

    /// Drains `events` until every sender is gone.
    ///
    /// This blocks the calling thread; run it on a dedicated thread or via
    /// `tokio::task::spawn_blocking`.
    pub fn run(mut self, events: mpsc::Receiver<HardwareEvent>) {
        for event in events {
            self.handle(event);
        }
        debug!("input source closed; event dispatcher stopping");
    }

    fn deliver(&self, msg: InputMessage) {
        match self.sink.submit(msg) {
            Ok(()) => {}
            Err(SinkError::Full) => {
                warn!("dropping {} message: connection task is backed up", msg.kind());
            }
            Err(SinkError::Closed) => {
                debug!("dropping {} message: connection task has stopped", msg.kind());
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use encoder_core::Direction;
    use mockall::predicate::eq;

    fn accepting_sink() -> MockMessageSink {
        let mut sink = MockMessageSink::new();
        sink.expect_submit().returning(|_| Ok(()));
        sink
    }

    #[test]
    fn test_rotation_up_submits_clockwise_message() {
        // Arrange
        let mut sink = MockMessageSink::new();
        sink.expect_submit()
            .with(eq(InputMessage::Encoder(Direction::Clockwise)))
            .times(1)
            .returning(|_| Ok(()));
        let mut dispatcher = EventDispatcher::new(sink, 10);

        // Act
        let emitted = dispatcher.on_rotated(11);

        // Assert
        assert_eq!(emitted, Some(InputMessage::Encoder(Direction::Clockwise)));
    }

    #[test]
    fn test_rotation_down_submits_counter_clockwise_message() {
        let mut sink = MockMessageSink::new();
        sink.expect_submit()
            .with(eq(InputMessage::Encoder(Direction::CounterClockwise)))
            .times(1)
            .returning(|_| Ok(()));
        let mut dispatcher = EventDispatcher::new(sink, 11);

        assert_eq!(
            dispatcher.on_rotated(9),
            Some(InputMessage::Encoder(Direction::CounterClockwise))
        );
    }

    #[test]
    fn test_unchanged_position_submits_nothing() {
        // Arrange: the mock fails the test if submit is called at all
        let mut sink = MockMessageSink::new();
        sink.expect_submit().never();
        let mut dispatcher = EventDispatcher::new(sink, 11);

        // Act
        let emitted = dispatcher.on_rotated(11);

        // Assert
        assert_eq!(emitted, None);
        assert_eq!(dispatcher.last_position(), 11);
    }

    #[test]
    fn test_baseline_moves_even_without_message() {
        let mut dispatcher = EventDispatcher::new(accepting_sink(), 0);
        dispatcher.on_rotated(4);
        dispatcher.on_rotated(4);
        assert_eq!(dispatcher.last_position(), 4);
        // The next reading is compared against 4, not the initial 0.
        assert_eq!(
            dispatcher.on_rotated(3),
            Some(InputMessage::Encoder(Direction::CounterClockwise))
        );
    }

    #[test]
    fn test_press_submits_exactly_one_button_message() {
        let mut sink = MockMessageSink::new();
        sink.expect_submit()
            .with(eq(InputMessage::button_pressed()))
            .times(1)
            .returning(|_| Ok(()));
        let mut dispatcher = EventDispatcher::new(sink, 0);

        assert_eq!(dispatcher.on_pressed(), InputMessage::button_pressed());
    }

    #[test]
    fn test_press_does_not_change_encoder_baseline() {
        let mut dispatcher = EventDispatcher::new(accepting_sink(), 7);
        dispatcher.handle(HardwareEvent::Pressed);
        assert_eq!(dispatcher.last_position(), 7);
    }

    #[test]
    fn test_full_sink_drops_message_without_panicking() {
        // Arrange
        let mut sink = MockMessageSink::new();
        sink.expect_submit().times(1).returning(|_| Err(SinkError::Full));
        let mut dispatcher = EventDispatcher::new(sink, 0);

        // Act: the record is still reported as produced
        let emitted = dispatcher.handle(HardwareEvent::Rotated { position: 1 });

        // Assert
        assert!(emitted.is_some());
    }

    #[test]
    fn test_reference_scenario_through_handle() {
        let mut dispatcher = EventDispatcher::new(accepting_sink(), 10);
        let emitted: Vec<_> = [11, 9, 9]
            .into_iter()
            .map(|position| dispatcher.handle(HardwareEvent::Rotated { position }))
            .collect();
        assert_eq!(
            emitted,
            vec![
                Some(InputMessage::Encoder(Direction::Clockwise)),
                Some(InputMessage::Encoder(Direction::CounterClockwise)),
                None,
            ]
        );
    }

    #[test]
    fn test_tokio_sender_sink_reports_full_channel() {
        // Arrange: capacity one, nothing draining
        let (tx, _rx) = tokio::sync::mpsc::channel(1);

        // Act
        let first = tx.submit(InputMessage::button_pressed());
        let second = tx.submit(InputMessage::button_pressed());

        // Assert
        assert_eq!(first, Ok(()));
        assert_eq!(second, Err(SinkError::Full));
    }

    #[test]
    fn test_tokio_sender_sink_reports_closed_channel() {
        let (tx, rx) = tokio::sync::mpsc::channel(1);
        drop(rx);
        assert_eq!(tx.submit(InputMessage::button_pressed()), Err(SinkError::Closed));
    }

    #[test]
    fn test_run_forwards_events_until_source_closes() {
        // Arrange
        let (events_tx, events_rx) = mpsc::channel();
        let (tx, mut rx) = tokio::sync::mpsc::channel(8);
        let dispatcher = EventDispatcher::new(tx, 10);
        events_tx.send(HardwareEvent::Rotated { position: 11 }).unwrap();
        events_tx.send(HardwareEvent::Pressed).unwrap();
        events_tx.send(HardwareEvent::Rotated { position: 11 }).unwrap();
        drop(events_tx);

        // Act: returns because the only event sender was dropped
        dispatcher.run(events_rx);

        // Assert
        assert_eq!(
            rx.try_recv().unwrap(),
            InputMessage::Encoder(Direction::Clockwise)
        );
        assert_eq!(rx.try_recv().unwrap(), InputMessage::button_pressed());
        assert!(rx.try_recv().is_err());
    }
}
