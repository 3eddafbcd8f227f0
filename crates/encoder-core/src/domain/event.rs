//! Raw events produced by an input source.

/// A hardware event as reported by an input source, before translation into a
/// wire message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareEvent {
    /// The encoder was rotated and now reads `position`.
    ///
    /// The position is a continuous counter; only its change between two
    /// events carries meaning.
    Rotated {
        /// Current encoder position in detents.
        position: i64,
    },
    /// The push button was pressed.
    Pressed,
}
