//! JSON message types sent to the WebSocket server.
//!
//! Every message is a flat JSON object with exactly two fields:
//!
//! ```json
//! {"type":"encoder","value":1}
//! {"type":"encoder","value":-1}
//! {"type":"button","value":"pressed"}
//! ```
//!
//! # JSON discriminant
//!
//! Serde's adjacently tagged representation (`tag = "type"`,
//! `content = "value"`) produces this shape directly from a Rust enum, so the
//! wire format and the type system cannot drift apart.  The `value` field is an
//! integer for encoder turns and a string for button presses; each variant
//! carries its own payload type to enforce that.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for encoding and decoding wire messages.
#[derive(Debug, Error)]
pub enum MessageError {
    /// The message could not be turned into JSON text.
    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),

    /// The JSON text did not describe a valid message.
    #[error("failed to decode message: {0}")]
    Decode(#[source] serde_json::Error),

    /// An encoder value other than -1 or +1 was supplied.
    #[error("invalid encoder direction {0}; expected -1 or 1")]
    InvalidDirection(i8),
}

// ── Direction ─────────────────────────────────────────────────────────────────

/// Rotation direction of a single encoder step.
///
/// Serialized as the integer `1` (clockwise) or `-1` (counter-clockwise).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum Direction {
    /// Position increased.
    Clockwise,
    /// Position decreased.
    CounterClockwise,
}

impl Direction {
    /// Returns the direction matching the sign of `delta`, or `None` for zero.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use encoder_core::Direction;
    ///
    /// assert_eq!(Direction::from_delta(3), Some(Direction::Clockwise));
    /// assert_eq!(Direction::from_delta(-1), Some(Direction::CounterClockwise));
    /// assert_eq!(Direction::from_delta(0), None);
    /// ```
    pub fn from_delta(delta: i64) -> Option<Self> {
        match delta.signum() {
            1 => Some(Self::Clockwise),
            -1 => Some(Self::CounterClockwise),
            _ => None,
        }
    }

    /// Returns the signed step value used on the wire.
    pub fn as_step(self) -> i8 {
        match self {
            Self::Clockwise => 1,
            Self::CounterClockwise => -1,
        }
    }
}

impl From<Direction> for i8 {
    fn from(direction: Direction) -> Self {
        direction.as_step()
    }
}

impl TryFrom<i8> for Direction {
    type Error = MessageError;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Clockwise),
            -1 => Ok(Self::CounterClockwise),
            other => Err(MessageError::InvalidDirection(other)),
        }
    }
}

// ── Button action ─────────────────────────────────────────────────────────────

/// What happened to the button.  Only presses are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonAction {
    /// The button went down.
    Pressed,
}

// ── Input message ─────────────────────────────────────────────────────────────

/// A single record forwarded to the WebSocket server.
///
/// # Serde representation
///
/// ```json
/// {"type":"encoder","value":1}
/// {"type":"button","value":"pressed"}
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum InputMessage {
    /// The encoder moved by one or more steps in the given direction.
    Encoder(Direction),
    /// The push button was actuated.
    Button(ButtonAction),
}

impl InputMessage {
    /// Convenience constructor for the only button message the bridge emits.
    pub fn button_pressed() -> Self {
        Self::Button(ButtonAction::Pressed)
    }

    /// Returns the value of the `type` field, for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Encoder(_) => "encoder",
            Self::Button(_) => "button",
        }
    }

    /// Serializes the message into a single-line JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::Encode`] if serialization fails.  With the
    /// current variants this cannot happen, but the error is propagated rather
    /// than unwrapped.
    pub fn to_json(&self) -> Result<String, MessageError> {
        serde_json::to_string(self).map_err(MessageError::Encode)
    }

    /// Parses a JSON text frame back into a message.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::Decode`] if the text is not valid JSON or does
    /// not match either message shape.
    pub fn from_json(text: &str) -> Result<Self, MessageError> {
        serde_json::from_str(text).map_err(MessageError::Decode)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
