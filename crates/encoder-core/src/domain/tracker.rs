//! Direction tracking across consecutive encoder readings.

use crate::protocol::messages::Direction;

/// Remembers the last observed encoder position and derives a direction from
/// each new reading.
///
/// The last observed value is replaced on *every* call to [`observe`], even
/// when the reading is unchanged and no direction is produced.
///
/// [`observe`]: EncoderTracker::observe
///
/// # Examples
///
/// ```rust
/// use encoder_core::{Direction, EncoderTracker};
///
/// let mut tracker = EncoderTracker::new(10);
/// assert_eq!(tracker.observe(11), Some(Direction::Clockwise));
/// assert_eq!(tracker.observe(9), Some(Direction::CounterClockwise));
/// assert_eq!(tracker.observe(9), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderTracker {
    last: i64,
}

impl EncoderTracker {
    /// Creates a tracker whose first comparison is made against `initial`.
    pub fn new(initial: i64) -> Self {
        Self { last: initial }
    }

    /// Returns the last observed position.
    pub fn last(&self) -> i64 {
        self.last
    }

    /// Records `position` and returns the direction of travel since the
    /// previous reading, or `None` when the position did not change.
    pub fn observe(&mut self, position: i64) -> Option<Direction> {
        // Compare instead of subtracting so extreme positions cannot overflow.
        let direction = match position.cmp(&self.last) {
            std::cmp::Ordering::Greater => Some(Direction::Clockwise),
            std::cmp::Ordering::Less => Some(Direction::CounterClockwise),
            std::cmp::Ordering::Equal => None,
        };
        self.last = position;
        direction
    }
}

impl Default for EncoderTracker {
    fn default() -> Self {
        Self::new(0)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
