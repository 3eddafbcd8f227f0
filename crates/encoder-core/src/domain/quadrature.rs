//! Quadrature decoding for mechanical rotary encoders.
//!
//! A rotary encoder has two contacts, CLK and DT, that open and close 90° out
//! of phase while the shaft turns.  Reading both pins gives a 2-bit Gray code
//! that walks through four states per detent:
//!
//! ```text
//! clockwise:          11 → 10 → 00 → 01 → 11
//! counter-clockwise:  11 → 01 → 00 → 10 → 11
//! ```
//!
//! `11` is the rest state when the pins use pull-up resistors, which is how the
//! encoder is wired on the Raspberry Pi header.  The decoder sums the signed
//! transitions and only reports a step once the contacts are back at rest,
//! which filters out contact bounce and half-turns that are rolled back.

use tracing::trace;

use crate::protocol::messages::Direction;

/// Gray-code state both contacts return to between detents.
const REST_STATE: u8 = 0b11;

/// Signed step for every `(previous << 2) | current` transition.
///
/// Zero entries are either "no change" or an impossible double step where a
/// state was skipped; both are ignored.
const TRANSITIONS: [i8; 16] = [
    0, 1, -1, 0, //
    -1, 0, 0, 1, //
    1, 0, 0, -1, //
    0, -1, 1, 0, //
];

/// Logic levels of the two encoder contacts at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinLevels {
    /// `true` when the CLK pin reads high.
    pub clk: bool,
    /// `true` when the DT pin reads high.
    pub dt: bool,
}

impl PinLevels {
    /// Creates a level pair.
    pub fn new(clk: bool, dt: bool) -> Self {
        Self { clk, dt }
    }

    fn code(self) -> u8 {
        (u8::from(self.clk) << 1) | u8::from(self.dt)
    }
}

/// Turns a stream of [`PinLevels`] samples into detent steps and keeps a
/// running position counter.
#[derive(Debug, Clone)]
pub struct QuadratureDecoder {
    state: u8,
    accumulated: i8,
    position: i64,
}

impl QuadratureDecoder {
    /// Creates a decoder that assumes the contacts start at rest.
    pub fn new() -> Self {
        Self {
            state: REST_STATE,
            accumulated: 0,
            position: 0,
        }
    }

    /// Creates a decoder from the levels sampled at start-up.
    pub fn with_initial(levels: PinLevels) -> Self {
        Self {
            state: levels.code(),
            ..Self::new()
        }
    }

    /// Current position in detents since the decoder was created.
    pub fn position(&self) -> i64 {
        self.position
    }

    /// Feeds one sample and returns the direction of a completed detent.
    pub fn update(&mut self, levels: PinLevels) -> Option<Direction> {
        let current = levels.code();
        if current == self.state {
            return None;
        }

        let step = TRANSITIONS[usize::from((self.state << 2) | current)];
        if step == 0 {
            trace!(
                "ignoring invalid quadrature transition {:02b} -> {:02b}",
                self.state,
                current
            );
        }
        self.accumulated = self.accumulated.saturating_add(step);
        self.state = current;

        if current != REST_STATE {
            return None;
        }

        let accumulated = std::mem::take(&mut self.accumulated);
        let direction = if accumulated >= 2 {
            Some(Direction::Clockwise)
        } else if accumulated <= -2 {
            Some(Direction::CounterClockwise)
        } else {
            None
        };
        if let Some(d) = direction {
            self.position += i64::from(d.as_step());
        }
        direction
    }
}

impl Default for QuadratureDecoder {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
