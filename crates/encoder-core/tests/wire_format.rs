//! Integration tests for the encoder-core public API.
//!
//! These tests drive hardware readings through the tracker and decoder and
//! check the exact JSON text the server will receive.

use encoder_core::{
    Direction, EncoderTracker, HardwareEvent, InputMessage, PinLevels, QuadratureDecoder,
};

/// Translates a hardware event the same way the bridge's dispatcher does.
fn translate(tracker: &mut EncoderTracker, event: HardwareEvent) -> Option<String> {
    let msg = match event {
        HardwareEvent::Rotated { position } => tracker.observe(position).map(InputMessage::Encoder),
        HardwareEvent::Pressed => Some(InputMessage::button_pressed()),
    }?;
    Some(msg.to_json().expect("encode must succeed"))
}

#[test]
fn test_reference_rotation_scenario_produces_expected_frames() {
    // Arrange
    let mut tracker = EncoderTracker::new(10);

    // Act
    let frames: Vec<_> = [11, 9, 9]
        .into_iter()
        .map(|position| translate(&mut tracker, HardwareEvent::Rotated { position }))
        .collect();

    // Assert
    assert_eq!(
        frames,
        vec![
            Some(r#"{"type":"encoder","value":1}"#.to_string()),
            Some(r#"{"type":"encoder","value":-1}"#.to_string()),
            None,
        ]
    );
}

#[test]
fn test_press_always_produces_exactly_one_frame() {
    let mut tracker = EncoderTracker::default();
    let frame = translate(&mut tracker, HardwareEvent::Pressed);
    assert_eq!(frame.as_deref(), Some(r#"{"type":"button","value":"pressed"}"#));
    // A press does not disturb the encoder baseline.
    assert_eq!(tracker.last(), 0);
}

#[test]
fn test_decoder_positions_feed_tracker_directions() {
    // Arrange: two clockwise detents followed by one counter-clockwise detent
    let mut decoder = QuadratureDecoder::new();
    let mut tracker = EncoderTracker::new(decoder.position());
    let samples = [
        0b10u8, 0b00, 0b01, 0b11, // cw
        0b10, 0b00, 0b01, 0b11, // cw
        0b01, 0b00, 0b10, 0b11, // ccw
    ];

    // Act
    let mut directions = Vec::new();
    for code in samples {
        let levels = PinLevels::new(code & 0b10 != 0, code & 0b01 != 0);
        if decoder.update(levels).is_some() {
            if let Some(d) = tracker.observe(decoder.position()) {
                directions.push(d);
            }
        }
    }

    // Assert
    assert_eq!(
        directions,
        vec![
            Direction::Clockwise,
            Direction::Clockwise,
            Direction::CounterClockwise
        ]
    );
}

#[test]
fn test_server_side_decode_of_every_shape() {
    for (text, expected) in [
        (r#"{"type":"encoder","value":1}"#, InputMessage::Encoder(Direction::Clockwise)),
        (r#"{"type":"encoder","value":-1}"#, InputMessage::Encoder(Direction::CounterClockwise)),
        (r#"{"type":"button","value":"pressed"}"#, InputMessage::button_pressed()),
    ] {
        assert_eq!(InputMessage::from_json(text).unwrap(), expected);
    }
}
