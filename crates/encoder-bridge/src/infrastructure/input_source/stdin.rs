//! Line-driven input source for running the bridge without GPIO hardware.
//!
//! Each line on stdin is one command:
//!
//! | Line            | Event                                  |
//! |-----------------|----------------------------------------|
//! | `+` / `cw`      | encoder one detent clockwise           |
//! | `-` / `ccw`     | encoder one detent counter-clockwise   |
//! | `42`            | encoder jumps to absolute position 42  |
//! | `p` / `press`   | button press                           |
//!
//! Blank lines are ignored; anything else is logged and skipped.

use std::io::BufRead;
use std::sync::{
    mpsc::{self, Sender},
    Arc, Mutex,
};

use encoder_core::HardwareEvent;
use tracing::{debug, warn};

use super::{InputSource, SourceError};

type SenderSlot = Arc<Mutex<Option<Sender<HardwareEvent>>>>;

/// Reads encoder and button commands from the process's stdin.
#[derive(Default)]
pub struct StdinInputSource {
    sender: SenderSlot,
}

impl StdinInputSource {
    /// Creates a stopped source.
    pub fn new() -> Self {
        Self::default()
    }
}

impl InputSource for StdinInputSource {
    fn start(&self) -> Result<mpsc::Receiver<HardwareEvent>, SourceError> {
        let (tx, rx) = mpsc::channel();
        {
            let mut guard = self.sender.lock().unwrap_or_else(|e| e.into_inner());
            if guard.is_some() {
                return Err(SourceError::AlreadyStarted);
            }
            *guard = Some(tx);
        }

        let slot = Arc::clone(&self.sender);
        std::thread::Builder::new()
            .name("stdin-input".to_string())
            .spawn(move || {
                let stdin = std::io::stdin();
                read_commands(stdin.lock(), &slot, 0);
            })
            .map_err(SourceError::Spawn)?;

        Ok(rx)
    }

    fn stop(&self) {
        // Dropping the only sender disconnects the receiver even while the
        // reader thread is still blocked on stdin.
        *self.sender.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

/// Parses one line into an event, given the current encoder position.
pub fn parse_command(line: &str, position: i64) -> Option<HardwareEvent> {
    let command = line.trim();
    match command.to_ascii_lowercase().as_str() {
        "" => None,
        "+" | "cw" => Some(HardwareEvent::Rotated {
            position: position.saturating_add(1),
        }),
        "-" | "ccw" => Some(HardwareEvent::Rotated {
            position: position.saturating_sub(1),
        }),
        "p" | "press" => Some(HardwareEvent::Pressed),
        other => match other.parse::<i64>() {
            Ok(absolute) => Some(HardwareEvent::Rotated { position: absolute }),
            Err(_) => {
                warn!("unrecognised input command '{command}'");
                None
            }
        },
    }
}

/// Reads commands until EOF or until the sender slot is emptied.
fn read_commands<R: BufRead>(reader: R, slot: &SenderSlot, initial_position: i64) {
    let mut position = initial_position;
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("failed to read stdin: {e}");
                break;
            }
        };
        let Some(event) = parse_command(&line, position) else {
            continue;
        };
        if let HardwareEvent::Rotated { position: next } = event {
            position = next;
        }

        let guard = slot.lock().unwrap_or_else(|e| e.into_inner());
        match guard.as_ref() {
            Some(sender) if sender.send(event).is_ok() => {}
            _ => {
                debug!("stdin input source stopped");
                return;
            }
        }
    }
    debug!("stdin reached end of input");
    // EOF: release the sender so the dispatcher sees the source end.
    *slot.lock().unwrap_or_else(|e| e.into_inner()) = None;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_plus_and_minus_step_from_current_position() {
        assert_eq!(parse_command("+", 4), Some(HardwareEvent::Rotated { position: 5 }));
        assert_eq!(parse_command("-", 4), Some(HardwareEvent::Rotated { position: 3 }));
        assert_eq!(parse_command(" CW ", 0), Some(HardwareEvent::Rotated { position: 1 }));
        assert_eq!(parse_command("ccw", 0), Some(HardwareEvent::Rotated { position: -1 }));
    }

    #[test]
    fn test_integer_sets_absolute_position() {
        assert_eq!(parse_command("10", 0), Some(HardwareEvent::Rotated { position: 10 }));
        assert_eq!(parse_command("-7", 0), Some(HardwareEvent::Rotated { position: -7 }));
    }

    #[test]
    fn test_press_commands() {
        assert_eq!(parse_command("p", 0), Some(HardwareEvent::Pressed));
        assert_eq!(parse_command("PRESS", 0), Some(HardwareEvent::Pressed));
    }

    #[test]
    fn test_blank_and_unknown_lines_are_ignored() {
        assert_eq!(parse_command("   ", 0), None);
        assert_eq!(parse_command("turn left", 0), None);
    }

    #[test]
    fn test_read_commands_tracks_position_across_lines() {
        // Arrange
        let (tx, rx) = mpsc::channel();
        let slot: SenderSlot = Arc::new(Mutex::new(Some(tx)));
        let input = Cursor::new("10\n+\n\n+\n-\np\n");

        // Act
        read_commands(input, &slot, 0);

        // Assert
        let events: Vec<_> = rx.iter().collect();
        assert_eq!(
            events,
            vec![
                HardwareEvent::Rotated { position: 10 },
                HardwareEvent::Rotated { position: 11 },
                HardwareEvent::Rotated { position: 12 },
                HardwareEvent::Rotated { position: 11 },
                HardwareEvent::Pressed,
            ]
        );
    }

    #[test]
    fn test_read_commands_stops_when_slot_is_emptied() {
        // Arrange: the source was stopped before any line arrived
        let slot: SenderSlot = Arc::new(Mutex::new(None));

        // Act / Assert: returns instead of looping over the remaining input
        read_commands(Cursor::new("+\n+\n"), &slot, 0);
        assert!(slot.lock().unwrap().is_none());
    }

    #[test]
    fn test_stop_disconnects_receiver() {
        let source = StdinInputSource::new();
        *source.sender.lock().unwrap() = Some(mpsc::channel().0);
        source.stop();
        assert!(source.sender.lock().unwrap().is_none());
    }
}
