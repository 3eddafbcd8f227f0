//! Press detection for an active-low push button.
//!
//! With the internal pull-up enabled the button pin reads high while released
//! and low while held, so a press is a high-to-low edge.

use std::time::{Duration, Instant};

/// Turns sampled button levels into discrete presses.
#[derive(Debug, Clone)]
pub struct ButtonDebouncer {
    was_high: bool,
    debounce: Option<Duration>,
    last_press: Option<Instant>,
}

impl ButtonDebouncer {
    /// Creates a detector for a released button.  With `debounce` set, edges
    /// within that window of the last reported press are ignored.
    pub fn new(debounce: Option<Duration>) -> Self {
        Self {
            was_high: true,
            debounce,
            last_press: None,
        }
    }

    /// Feeds one sample taken at `now`.  Returns `true` on a new press.
    pub fn update(&mut self, is_high: bool, now: Instant) -> bool {
        let falling = self.was_high && !is_high;
        self.was_high = is_high;
        if !falling {
            return false;
        }

        if let (Some(window), Some(last)) = (self.debounce, self.last_press) {
            if now.saturating_duration_since(last) < window {
                return false;
            }
        }
        self.last_press = Some(now);
        true
    }
}

impl Default for ButtonDebouncer {
    fn default() -> Self {
        Self::new(None)
    }
}
